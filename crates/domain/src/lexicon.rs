//! Fixed vocabularies used to guess the business domain of a codebase.

/// Weight of an entity-term hit
pub const ENTITY_WEIGHT: u32 = 3;
/// Weight of an action-term hit
pub const ACTION_WEIGHT: u32 = 2;
/// Weight of a property-term hit
pub const PROPERTY_WEIGHT: u32 = 1;
/// Minimum score for a lexicon to be selected
pub const DOMAIN_THRESHOLD: u32 = 6;

pub const FALLBACK_DOMAIN: &str = "General Application";
pub const FALLBACK_DESCRIPTION: &str =
    "No dominant business vocabulary was found; the model reflects the code structure only.";

#[derive(Debug)]
pub struct DomainLexicon {
    pub name: &'static str,
    pub description: &'static str,
    pub entities: &'static [&'static str],
    pub actions: &'static [&'static str],
    pub properties: &'static [&'static str],
}

impl DomainLexicon {
    /// Weighted hit count over already lowercased words
    pub fn score<'a>(&self, words: impl IntoIterator<Item = &'a str>) -> u32 {
        words
            .into_iter()
            .map(|word| {
                if self.entities.contains(&word) {
                    ENTITY_WEIGHT
                } else if self.actions.contains(&word) {
                    ACTION_WEIGHT
                } else if self.properties.contains(&word) {
                    PROPERTY_WEIGHT
                } else {
                    0
                }
            })
            .sum()
    }
}

/// Ordered; earlier lexicons win ties
pub static LEXICONS: &[DomainLexicon] = &[
    DomainLexicon {
        name: "E-Commerce",
        description: "Online retail: catalogues, carts, orders and payments.",
        entities: &[
            "product", "products", "cart", "order", "orders", "customer", "customers", "catalog",
            "inventory", "invoice", "shipment", "coupon", "checkout", "sku",
        ],
        actions: &["purchase", "checkout", "ship", "refund", "discount", "fulfil", "fulfill"],
        properties: &["price", "quantity", "stock", "total", "tax", "currency"],
    },
    DomainLexicon {
        name: "User Management",
        description: "Identity and access: users, accounts, roles and sessions.",
        entities: &[
            "user", "users", "account", "accounts", "profile", "role", "roles", "permission",
            "permissions", "session", "sessions", "credential", "credentials",
        ],
        actions: &[
            "login", "logout", "register", "authenticate", "authorize", "signup", "signin",
            "invite", "verify",
        ],
        properties: &["email", "password", "username", "token", "avatar"],
    },
    DomainLexicon {
        name: "Finance",
        description: "Money movement: accounts, ledgers, transactions and payments.",
        entities: &[
            "transaction", "transactions", "ledger", "payment", "payments", "wallet", "loan",
            "budget", "expense", "expenses", "transfer",
        ],
        actions: &["deposit", "withdraw", "charge", "settle", "reconcile", "pay"],
        properties: &["balance", "amount", "interest", "fee", "iban"],
    },
    DomainLexicon {
        name: "Content Management",
        description: "Publishing: posts, articles, pages and media.",
        entities: &[
            "post", "posts", "article", "articles", "page", "pages", "comment", "comments", "tag",
            "tags", "media", "category", "author", "blog",
        ],
        actions: &["publish", "draft", "edit", "moderate", "archive"],
        properties: &["title", "slug", "body", "excerpt", "content"],
    },
    DomainLexicon {
        name: "Project Management",
        description: "Planning work: projects, tasks, boards and sprints.",
        entities: &[
            "project", "projects", "task", "tasks", "board", "sprint", "milestone", "issue",
            "issues", "ticket", "tickets", "team",
        ],
        actions: &["assign", "schedule", "estimate", "close", "reopen", "prioritize"],
        properties: &["deadline", "priority", "status", "assignee", "progress"],
    },
    DomainLexicon {
        name: "Healthcare",
        description: "Clinical care: patients, appointments and prescriptions.",
        entities: &[
            "patient", "patients", "doctor", "appointment", "appointments", "prescription",
            "diagnosis", "clinic", "treatment",
        ],
        actions: &["prescribe", "diagnose", "admit", "discharge", "treat"],
        properties: &["dosage", "symptom", "allergy", "vitals"],
    },
    DomainLexicon {
        name: "Education",
        description: "Learning: courses, lessons, students and grades.",
        entities: &[
            "course", "courses", "lesson", "lessons", "student", "students", "teacher",
            "enrollment", "quiz", "exam", "assignment",
        ],
        actions: &["enroll", "grade", "submit", "teach", "learn"],
        properties: &["score", "credit", "semester", "curriculum"],
    },
    DomainLexicon {
        name: "Messaging",
        description: "Communication: conversations, messages and notifications.",
        entities: &[
            "message", "messages", "conversation", "channel", "channels", "notification",
            "notifications", "chat", "thread", "inbox",
        ],
        actions: &["send", "receive", "notify", "broadcast", "reply", "subscribe"],
        properties: &["recipient", "sender", "unread", "attachment"],
    },
    DomainLexicon {
        name: "Logistics",
        description: "Moving goods: shipments, warehouses, routes and deliveries.",
        entities: &[
            "warehouse", "delivery", "deliveries", "vehicle", "route", "carrier", "parcel",
            "package", "fleet",
        ],
        actions: &["dispatch", "deliver", "track", "load", "unload"],
        properties: &["weight", "destination", "eta", "tracking"],
    },
];

/// Split identifiers and paths into lowercase words (`getUserById` -> get, user, by, id)
pub fn words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in text.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Highest-scoring lexicon above [`DOMAIN_THRESHOLD`], first one on ties
pub fn infer_domain(text: &str) -> Option<&'static DomainLexicon> {
    let words = words(text);
    let mut best: Option<(&DomainLexicon, u32)> = None;
    for lexicon in LEXICONS {
        let score = lexicon.score(words.iter().map(String::as_str));
        log::debug!("Domain lexicon {} scored {score}", lexicon.name);
        if score < DOMAIN_THRESHOLD {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((lexicon, score));
        }
    }
    best.map(|(lexicon, _)| lexicon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_words() {
        assert_eq!(words("getUserById"), vec!["get", "user", "by", "id"]);
        assert_eq!(
            words("src/users/user.repository.ts"),
            vec!["src", "users", "user", "repository", "ts"]
        );
        assert_eq!(words("HTTPClient"), vec!["httpclient"]);
    }

    #[test]
    fn test_infer_domain() {
        let text = "UserRepository UserService login src/users/user.service.ts";
        assert_eq!(infer_domain(text).map(|l| l.name), Some("User Management"));
        assert!(infer_domain("parseArgs formatDate").is_none());
    }

    #[test]
    fn test_ties_prefer_earlier_lexicon() {
        // "order" (E-Commerce) and "user" (User Management) both score 3 per hit
        let text = "order order user user";
        assert_eq!(infer_domain(text).map(|l| l.name), Some("E-Commerce"));
    }
}
