//! Job description text extraction

use crate::error::Result;
use pulldown_cmark::{Event, Parser, Tag};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

/// Render markdown to plain text, one block per line
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(content) | Event::Code(content) => text.push_str(&content),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak | Event::Start(Tag::List(_)) => text.push('\n'),
            Event::End(Tag::Heading(..) | Tag::Paragraph | Tag::Item | Tag::CodeBlock(_)) => {
                text.push('\n')
            }
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text() {
        let markdown = "# Senior Rust Engineer\n\n**Requirements**\n\n- 5+ years with `Rust`\n- Experience with\nKubernetes\n";
        let text = markdown_to_text(markdown);

        assert_eq!(
            text,
            "Senior Rust Engineer\nRequirements\n5+ years with Rust\nExperience with Kubernetes"
        );
    }

    #[tokio::test]
    async fn test_plain_text_extraction() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("jd.txt");
        std::fs::write(&path, "Backend Engineer\nRust").unwrap();

        let text = PlainTextExtractor.extract(&path).await.unwrap();
        assert_eq!(text, "Backend Engineer\nRust");
    }
}
