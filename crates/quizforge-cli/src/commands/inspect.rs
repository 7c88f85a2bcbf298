//! The `quizforge inspect` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::model::Node;
use quizforge_core::parser::load_document;

pub fn execute(document_path: PathBuf) -> Result<()> {
    let document = load_document(&document_path)?;
    let resource = document.resource();

    println!("{} ({})", resource.title, resource.id);

    let mut table = Table::new();
    table.set_header(vec![
        "Page", "Node", "Kind", "Interactions", "Parts", "Hints", "Explained",
    ]);

    for (index, page) in document.pages().iter().enumerate() {
        for node in &page.nodes {
            let row = match node {
                Node::Question(q) => vec![
                    Cell::new(index + 1),
                    Cell::new(&q.id),
                    Cell::new(node.kind()),
                    Cell::new(
                        q.interactions
                            .iter()
                            .map(|i| format!("{}:{}", i.id, i.style))
                            .collect::<Vec<_>>()
                            .join(" "),
                    ),
                    Cell::new(q.parts.len()),
                    Cell::new(q.parts.iter().map(|p| p.hints.len()).sum::<usize>()),
                    Cell::new(
                        q.parts
                            .iter()
                            .filter(|p| p.explanation_body().is_some())
                            .count(),
                    ),
                ],
                other => vec![
                    Cell::new(index + 1),
                    Cell::new(node_id(other)),
                    Cell::new(other.kind()),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                    Cell::new(""),
                ],
            };
            table.add_row(row);
        }
    }

    println!("{table}");
    println!(
        "{} page(s), {} question(s)",
        document.page_count(),
        document.questions().count()
    );

    Ok(())
}

fn node_id(node: &Node) -> &str {
    match node {
        Node::Content(c) => c.id.as_deref().unwrap_or("-"),
        Node::Question(q) => &q.id,
        Node::Section(s) => &s.id,
        Node::Selection(s) => &s.id,
        Node::QuestionBankRef(r) => &r.id,
    }
}
