use codewiki_chunker::FileAnalysis;
use codewiki_graph::DependencyGraph;
use serde::{Deserialize, Serialize};

/// Score a codebase starts from before penalties
pub const MAX_HEALTH: u32 = 100;

/// A callable whose complexity reached the hotspot threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub chunk_id: String,
    pub name: String,
    pub file: String,
    pub complexity: u32,
}

/// Size, complexity and structural health of the analyzed files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebaseMetrics {
    pub files: usize,
    pub chunks: usize,
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Mean complexity over functions and methods
    pub average_complexity: f64,
    /// Sorted by complexity, highest first
    pub hotspots: Vec<Hotspot>,
    /// File-level import cycles
    pub cycles: Vec<Vec<String>>,
    pub health_score: u32,
}

impl CodebaseMetrics {
    pub fn compute(files: &[FileAnalysis], graph: &DependencyGraph, hotspot_complexity: u32) -> Self {
        let mut metrics = Self::default();
        let mut callables = 0usize;
        let mut complexity_sum = 0u64;

        for file in files {
            metrics.files += 1;
            metrics.chunks += file.chunks.len();
            metrics.total_lines += file.summary.total_lines;
            metrics.code_lines += file.summary.code_lines;
            metrics.comment_lines += file.summary.comment_lines;
            metrics.blank_lines += file.summary.blank_lines;

            for chunk in file.chunks.iter().filter(|c| c.chunk_type.is_callable()) {
                callables += 1;
                complexity_sum += u64::from(chunk.metadata.complexity);
                if chunk.metadata.complexity >= hotspot_complexity {
                    metrics.hotspots.push(Hotspot {
                        chunk_id: chunk.id.clone(),
                        name: chunk.name.clone(),
                        file: file.relative_path.clone(),
                        complexity: chunk.metadata.complexity,
                    });
                }
            }
        }

        metrics.hotspots.sort_by(|a, b| {
            b.complexity
                .cmp(&a.complexity)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        if callables > 0 {
            metrics.average_complexity = complexity_sum as f64 / callables as f64;
        }
        metrics.cycles = graph.import_cycles();
        metrics.health_score = health_score(
            metrics.average_complexity,
            metrics.hotspots.len(),
            metrics.cycles.len(),
        );

        log::debug!(
            "Health {}: avg complexity {:.2}, {} hotspots, {} cycles",
            metrics.health_score,
            metrics.average_complexity,
            metrics.hotspots.len(),
            metrics.cycles.len()
        );
        metrics
    }

    /// Short verdict for the score
    pub fn grade(&self) -> &'static str {
        match self.health_score {
            90.. => "excellent",
            75..=89 => "good",
            50..=74 => "fair",
            _ => "poor",
        }
    }
}

/// `100` minus fixed penalties, floored at `0`:
///
/// | signal              | penalty                  |
/// |---------------------|--------------------------|
/// | average complexity  | 10 above 5, 20 above 10, 30 above 20 |
/// | hotspots            | 5 each, at most 40       |
/// | import cycles       | 10 each, at most 40      |
#[must_use]
pub fn health_score(average_complexity: f64, hotspots: usize, cycles: usize) -> u32 {
    let complexity_penalty = if average_complexity > 20.0 {
        30
    } else if average_complexity > 10.0 {
        20
    } else if average_complexity > 5.0 {
        10
    } else {
        0
    };
    let hotspot_penalty = u32::try_from(hotspots.saturating_mul(5)).unwrap_or(u32::MAX).min(40);
    let cycle_penalty = u32::try_from(cycles.saturating_mul(10)).unwrap_or(u32::MAX).min(40);

    MAX_HEALTH
        .saturating_sub(complexity_penalty)
        .saturating_sub(hotspot_penalty)
        .saturating_sub(cycle_penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_penalties() {
        assert_eq!(health_score(1.0, 0, 0), 100);
        assert_eq!(health_score(6.0, 0, 0), 90);
        assert_eq!(health_score(12.0, 2, 1), 60);
        assert_eq!(health_score(50.0, 100, 100), 0);
        assert_eq!(health_score(f64::NAN, 0, 0), 100);
    }
}
