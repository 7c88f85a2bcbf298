//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    std::fs::create_dir_all("assessments")?;
    let example_path = Path::new("assessments/example.json");
    if example_path.exists() {
        println!("assessments/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DOCUMENT)?;
        println!("Created assessments/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizforge.toml with your server URL and theme");
    println!("  2. Run: quizforge validate --document assessments/example.json");
    println!("  3. Run: quizforge deliver --document assessments/example.json --page 1");
    println!("  4. Run: quizforge evaluate --document assessments/example.json --question q1 --response i1=a");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

server_url = "http://localhost:8080"
theme_id = "default"
id_length = 12

[renderer]
type = "markup"
check_balance = true
asset_prefix = "webcontent/"
"#;

const EXAMPLE_DOCUMENT: &str = r#"{
  "resource": { "id": "example", "title": "Example Assessment" },
  "pages": [
    {
      "id": "page-1",
      "title": "Getting Started",
      "nodes": [
        { "type": "content", "body": "<p>A first question to try the engine with.</p>" },
        {
          "type": "question",
          "id": "q1",
          "body": "<p>Which of these is a prime number?</p>",
          "interactions": [
            {
              "id": "i1",
              "style": "multiple_choice",
              "choices": [
                { "value": "a", "body": "7" },
                { "value": "b", "body": "9" },
                { "value": "c", "body": "15" }
              ]
            }
          ],
          "parts": [
            {
              "id": "p1",
              "responseConditions": [
                {
                  "criteria": { "interactionId": "i1", "match": "a" },
                  "outcome": { "score": 1, "feedbacks": [ { "body": "<p>Right, 7 has no divisors but 1 and itself.</p>" } ] }
                },
                {
                  "criteria": { "interactionId": "i1" },
                  "outcome": { "score": 0, "feedbacks": [ { "body": "<p>That one has a divisor other than 1.</p>" } ] }
                }
              ],
              "hints": [ { "body": "<p>Try dividing by 3.</p>" } ]
            }
          ]
        }
      ]
    }
  ]
}
"#;
