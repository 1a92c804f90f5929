//! Visure ALM CLI binary.
//!
//! A command-line interface over the visureapi library.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::Level;
use visureapi::cli::{Cli, Command};
use visureapi::{
    Attribute, Element, ElementQuery, LinkField, LinkOptions, PrettyPrint, Project,
    Specification, Visure, VisureError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = match cli.connection.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set VISURE_URL, VISURE_USERNAME and VISURE_PASSWORD");
            return ExitCode::FAILURE;
        }
    };

    let mut visure = match Visure::connect(config).await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut visure, cli).await;

    if let Err(e) = visure.logout().await {
        tracing::warn!(error = %e, "logout failed");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(visure: &mut Visure, cli: Cli) -> visureapi::Result<()> {
    let json = cli.json;

    match cli.command {
        Command::Projects => {
            let rows: Vec<ProjectRow> = visure.projects().iter().map(ProjectRow::from).collect();
            output_rows(visure.projects(), rows, json)
        }
        Command::Specs { project } => {
            let project = find_project(visure, project)?;
            let specs = project.fetch_specifications().await?;
            let rows: Vec<SpecificationRow> = specs.iter().map(SpecificationRow::from).collect();
            output_rows(specs, rows, json)
        }
        Command::Elements {
            project,
            spec,
            search,
            deep,
        } => handle_elements(find_project(visure, project)?, spec, search, deep, json).await,
        Command::Attributes { project, element } => {
            let mut element = find_project(visure, project)?.element(element);
            let attributes = element.fetch_attributes().await?;
            let rows: Vec<AttributeRow> = attributes.iter().map(AttributeRow::from).collect();
            output_rows(attributes, rows, json)
        }
        Command::AttributeTypes { project } => {
            let types = find_project(visure, project)?.fetch_attribute_types().await?;
            let rows: Vec<AttributeRow> = types.iter().map(AttributeRow::from).collect();
            output_rows(&types, rows, json)
        }
        Command::SetName {
            project,
            element,
            name,
        } => {
            let project = find_project(visure, project)?;
            project.element(element).set_name(&name).await?;
            report(json, element, "name updated")
        }
        Command::SetCode {
            project,
            element,
            code,
        } => {
            let project = find_project(visure, project)?;
            project.element(element).set_code(&code).await?;
            report(json, element, "code updated")
        }
        Command::SetDescription {
            project,
            element,
            description,
        } => {
            let project = find_project(visure, project)?;
            project.element(element).set_description(&description).await?;
            report(json, element, "description updated")
        }
        Command::SetType {
            project,
            element,
            requirement_type,
        } => {
            let mut handle = find_project(visure, project)?.element(element);
            handle.set_type(&requirement_type).await?;
            report(json, element, &format!("type set to {requirement_type}"))
        }
        Command::Link {
            project,
            source,
            target,
            relationship_type,
            suspect,
            reason,
        } => {
            let element = find_project(visure, project)?.element(source);
            let mut options = LinkOptions::default().suspect(suspect);
            if let Some(type_id) = relationship_type {
                let available = element.available_relationships(target).await?;
                let chosen = available
                    .into_iter()
                    .find(|t| t.id == type_id)
                    .ok_or_else(|| VisureError::NotFound {
                        entity_type: "relationship type",
                        id: type_id.to_string(),
                    })?;
                options = options.with_type(chosen);
            }
            if let Some(reason) = reason {
                options = options.with_reason(reason);
            }

            let response = element.create_link(target, options).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("Linked {source} -> {target}");
            }
            Ok(())
        }
        Command::InlineLink {
            project,
            element,
            field,
        } => {
            let field = match field.parse::<i64>() {
                Ok(index) => LinkField::Index(index),
                Err(_) => LinkField::Name(&field),
            };
            let link = find_project(visure, project)?
                .element(element)
                .in_line_link(field)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&link)?);
            } else {
                println!("{link}");
            }
            Ok(())
        }
    }
}

fn find_project(visure: &mut Visure, id: i64) -> visureapi::Result<&mut Project> {
    visure.project_mut(id).ok_or_else(|| VisureError::NotFound {
        entity_type: "project",
        id: id.to_string(),
    })
}

async fn handle_elements(
    project: &mut Project,
    spec_id: i64,
    search: Option<String>,
    deep: bool,
    json: bool,
) -> visureapi::Result<()> {
    project.fetch_specifications().await?;
    let spec = project
        .specification_mut(spec_id)
        .ok_or_else(|| VisureError::NotFound {
            entity_type: "specification",
            id: spec_id.to_string(),
        })?;

    let query = ElementQuery {
        search,
        deep,
        ..Default::default()
    };
    let elements = spec.fetch_elements(&query).await?;

    if deep && !json {
        for element in elements.iter() {
            println!("{}\n", element.pretty_print());
        }
        return Ok(());
    }

    let rows: Vec<ElementRow> = elements.iter().map(ElementRow::from).collect();
    output_rows(elements, rows, json)
}

fn report(json: bool, element: i64, message: &str) -> visureapi::Result<()> {
    if json {
        let body = serde_json::json!({ "element": element, "status": message });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Element {element}: {message}");
    }
    Ok(())
}

fn output_rows<T, R>(items: &[T], rows: Vec<R>, json: bool) -> visureapi::Result<()>
where
    T: Serialize,
    R: Tabled,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct ProjectRow {
    id: i64,
    name: String,
    groups: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id(),
            name: p.name.clone().unwrap_or_default(),
            groups: p
                .groups()
                .iter()
                .map(|g| g.name.clone().unwrap_or_else(|| g.id.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Tabled)]
struct SpecificationRow {
    id: i64,
    prefix: String,
    name: String,
    #[tabled(rename = "type")]
    doc_type: String,
}

impl From<&Specification> for SpecificationRow {
    fn from(s: &Specification) -> Self {
        Self {
            id: s.id(),
            prefix: s.prefix.clone().unwrap_or_default(),
            name: s.name.clone().unwrap_or_default(),
            doc_type: s.doc_type.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ElementRow {
    id: String,
    code: String,
    name: String,
}

impl From<&Element> for ElementRow {
    fn from(e: &Element) -> Self {
        Self {
            id: e.id().map(|id| id.to_string()).unwrap_or_default(),
            code: e.code.clone().unwrap_or_default(),
            name: e.name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct AttributeRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    base_type: String,
    values: String,
}

impl From<&Attribute> for AttributeRow {
    fn from(a: &Attribute) -> Self {
        Self {
            id: a.id().map(|id| id.to_string()).unwrap_or_default(),
            name: a.name.clone().unwrap_or_default(),
            base_type: a.base_type.clone().unwrap_or_default(),
            values: a
                .values
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
