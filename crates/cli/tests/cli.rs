use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/repositories")).unwrap();
    fs::create_dir_all(root.join("src/services")).unwrap();
    fs::write(
        root.join("src/repositories/order.repository.ts"),
        r#"
/** Persists orders. */
export class OrderRepository {
    async findById(id: string): Promise<Order | null> {
        return this.db.get(id);
    }

    async save(order: Order): Promise<Order> {
        return this.db.put(order);
    }
}
"#,
    )
    .unwrap();
    fs::write(
        root.join("src/services/order.service.ts"),
        r#"
import { OrderRepository } from '../repositories/order.repository';

/** Checkout rules. */
export class OrderService {
    constructor(private readonly orders: OrderRepository) {}

    async checkout(orderId: string): Promise<void> {
        const order = await this.orders.findById(orderId);
        if (!order) {
            throw new Error('missing order');
        }
    }
}
"#,
    )
    .unwrap();
    temp
}

#[allow(deprecated)]
fn codewiki(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codewiki").expect("binary");
    cmd.current_dir(workdir).arg("--quiet");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn generate_writes_wiki() {
    let project = setup_project();
    let out = TempDir::new().unwrap();

    let report = json_stdout(
        codewiki(project.path())
            .arg("generate")
            .arg(".")
            .arg("--out")
            .arg(out.path()),
    );

    assert_eq!(report["files"], 2);
    assert_eq!(report["dry_run"], false);
    assert!(report["failed"].as_array().unwrap().is_empty());
    let documents: Vec<&str> = report["documents"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(documents.contains(&"overview.md"));
    assert!(documents.contains(&"patterns/repository.md"));

    let overview = fs::read_to_string(out.path().join("overview.md")).unwrap();
    assert!(overview.starts_with("---\n"));
    assert!(out.path().join("index.md").is_file());
}

#[test]
fn generate_dry_run_writes_nothing() {
    let project = setup_project();
    let out = TempDir::new().unwrap();
    let target = out.path().join("wiki");

    let report = json_stdout(
        codewiki(project.path())
            .args(["generate", ".", "--dry-run", "--out"])
            .arg(&target),
    );

    assert_eq!(report["dry_run"], true);
    assert!(!report["documents"].as_array().unwrap().is_empty());
    assert!(!target.exists());
}

#[test]
fn generate_respects_ignore_and_config() {
    let project = setup_project();
    let out = TempDir::new().unwrap();
    fs::write(
        project.path().join("codewiki.toml"),
        "ignore = [\"services\"]\nwrite_retries = 0\n",
    )
    .unwrap();

    let report = json_stdout(
        codewiki(project.path())
            .args(["generate", ".", "--dry-run", "--out"])
            .arg(out.path()),
    );
    assert_eq!(report["files"], 1);
}

#[test]
fn patterns_prints_json() {
    let project = setup_project();
    let patterns = json_stdout(codewiki(project.path()).args(["patterns", "."]));

    let types: Vec<&str> = patterns
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["pattern_type"].as_str())
        .collect();
    assert!(types.contains(&"repository"));
    assert!(types.contains(&"service-layer"));
}

#[test]
fn patterns_and_search_respect_project_config() {
    let project = setup_project();
    fs::write(
        project.path().join("codewiki.toml"),
        "ignore = [\"services\"]\n",
    )
    .unwrap();

    let patterns = json_stdout(codewiki(project.path()).args(["patterns", "."]));
    let types: Vec<&str> = patterns
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["pattern_type"].as_str())
        .collect();
    assert!(types.contains(&"repository"));
    assert!(!types.contains(&"service-layer"));

    let hits = json_stdout(codewiki(project.path()).args(["search", ".", "checkout order"]));
    assert!(hits
        .as_array()
        .unwrap()
        .iter()
        .all(|hit| hit["name"] != "checkout"));
}

#[test]
fn search_prints_ranked_hits() {
    let project = setup_project();
    let hits = json_stdout(
        codewiki(project.path()).args(["search", ".", "checkout order", "--limit", "3"]),
    );

    let hits = hits.as_array().unwrap();
    assert!(!hits.is_empty() && hits.len() <= 3);
    assert_eq!(hits[0]["name"], "checkout");
}

#[test]
fn file_prints_markdown() {
    let project = setup_project();
    codewiki(project.path())
        .args(["file", "src/services/order.service.ts", "--base", "."])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---\ntitle: "))
        .stdout(predicate::str::contains("src/services/order.service.ts"))
        .stdout(predicate::str::contains("## Declarations"))
        .stdout(predicate::str::contains("`OrderService`"));
}

#[test]
fn missing_project_fails() {
    let temp = TempDir::new().unwrap();
    codewiki(temp.path())
        .args(["patterns", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}
