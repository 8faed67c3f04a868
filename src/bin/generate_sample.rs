use std::path::PathBuf;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform index in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

const STATES: &[&str] = &["Backlog", "In Progress", "Content Review", "Client Review", "Done"];
const USERS: &[&str] = &["Jim", "Sarah P", "Sarah C", "Braden", ""];
const SECTIONS: &[&str] = &["hunting", "fishing", "boating", "parks", "wildlife", "education"];
const TOPICS: &[&str] = &[
    "licenses",
    "seasons",
    "regulations",
    "maps",
    "reports",
    "events",
    "permits",
    "contacts",
];
const NOTES: &[&str] = &["", "", "needs images", "check links", "waiting on client", "merged page"];
const EPICS: &[&str] = &["MDW-101", "MDW-102", "MDW-103", "MDW-104"];

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("folder/out.csv"));

    let mut rng = SimpleRng::new(42);
    let rows = 60;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    writer.write_record([
        "State",
        "Users",
        "Notes",
        "Legacy URL",
        "New URL",
        "Title",
        "Suggested Title",
        "Jira Epic",
        "Due",
    ])?;

    for i in 0..rows {
        let section = rng.pick(SECTIONS);
        let topic = rng.pick(TOPICS);
        let state = rng.pick(STATES);
        let new_url = if state == "Backlog" {
            String::new()
        } else {
            format!("https://www.example.gov/{section}/{topic}")
        };
        let due = format!("2024-{:02}-{:02}", 1 + rng.below(6), 1 + rng.below(28));

        writer.write_record([
            state.to_string(),
            rng.pick(USERS).to_string(),
            rng.pick(NOTES).to_string(),
            format!("https://legacy.example.gov/{section}/{topic}/page{i}.aspx"),
            new_url,
            format!("{} {}", title_case(section), topic),
            format!("{} {} ({i})", title_case(topic), section),
            rng.pick(EPICS).to_string(),
            due,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} tasks to {}", output_path.display());
    Ok(())
}
