//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::hydrate::Field;
use crate::{Attribute, Element, Project, Specification};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn divider(header: &str) -> String {
    "─".repeat(header.chars().count().max(30))
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let header = format!("Project: {}", self.id());
        let mut lines = vec![header.clone(), divider(&header)];

        if let Some(ref name) = self.name {
            lines.push(format!("Name:           {}", name));
        }

        if !self.groups().is_empty() {
            let groups: Vec<String> = self
                .groups()
                .iter()
                .map(|g| match g.name {
                    Some(ref name) => format!("{} ({})", name, g.id),
                    None => g.id.to_string(),
                })
                .collect();
            lines.push(format!("Groups:         {}", groups.join(", ")));
        }

        if let Some(specs) = self.specifications() {
            lines.push(format!("Specifications: {}", specs.len()));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Specification {
    fn pretty_print(&self) -> String {
        let header = format!("Specification: {}", self.id());
        let mut lines = vec![header.clone(), divider(&header)];

        if let Some(ref name) = self.name {
            lines.push(format!("Name:           {}", name));
        }

        if let Some(ref prefix) = self.prefix {
            lines.push(format!("Prefix:         {}", prefix));
        }

        if let Some(ref author) = self.author {
            lines.push(format!("Author:         {}", author));
        }

        if let Some(ref doc_type) = self.doc_type {
            lines.push(format!("Type:           {}", doc_type));
        }

        if let Some(ref status) = self.check_in_status {
            lines.push(format!("Check-in:       {}", status));
        }

        if let Some(elements) = self.elements() {
            lines.push(format!("Elements:       {}", elements.len()));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Element {
    fn pretty_print(&self) -> String {
        let header = match self.id() {
            Some(id) => format!("Element: {}", id),
            None => "Element".to_string(),
        };
        let mut lines = vec![header.clone(), divider(&header)];

        if let Some(ref code) = self.code {
            lines.push(format!("Code:           {}", code));
        }

        if let Some(ref name) = self.name {
            lines.push(format!("Name:           {}", name));
        }

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        // Scalar side-table fields only; nested objects are --json territory.
        for (key, field) in self.extra() {
            if let Field::Value(value) = field {
                lines.push(format!("{:<16}{}", format!("{key}:"), value));
            }
        }

        if let Some(attributes) = self.attributes() {
            lines.push("Attributes:".to_string());
            lines.extend(attributes.iter().map(|a| format!("  {a}")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Attribute {
    fn pretty_print(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrate::HydrationContext;
    use crate::{FromData, ParserRegistry, Session, VisureClient};

    #[test]
    fn test_project_pretty_print_format() {
        let client = VisureClient::new("https://visure.example.com", true).unwrap();
        let session = Session::new(client, ParserRegistry::default());
        let ctx = HydrationContext::new(&session);
        let project = Project::from_data(
            &serde_json::json!({
                "id": 12,
                "name": "Braking",
                "groups": [{"id": 1, "name": "Authors"}]
            }),
            &ctx,
        )
        .unwrap();

        let output = project.pretty_print();
        assert!(output.starts_with("Project: 12"));
        assert!(output.contains("Braking"));
        assert!(output.contains("Authors (1)"));
    }
}
