//! services/dashboard/src/commands.rs
//!
//! Executes parsed CLI commands against the settings store and the domain
//! stores, printing human-readable output. This is the only module that
//! writes to stdout; everything below it reports through `Result` values
//! and `tracing`.

use bytes::Bytes;
use futures::future::join_all;
use grading_assistant_core::domain::{Document, RubricDraft};
use grading_assistant_core::ports::DocRouterService;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use crate::cli::{
    Commands, DocumentsCommand, GradingCommand, RubricsCommand, SetArgs, SettingsCommand,
};
use crate::config::{CredentialSource, SettingsStore};
use crate::connection::test_connection;
use crate::error::DashboardError;
use crate::stores::{DocumentStore, GradingStore, RubricStore};

/// Everything a command needs, wired once at startup.
pub struct App {
    pub settings: Arc<SettingsStore>,
    pub api: Arc<dyn DocRouterService>,
    pub documents: DocumentStore,
    pub rubrics: RubricStore,
    pub grading: GradingStore,
}

pub async fn run(app: &App, command: Commands) -> Result<(), DashboardError> {
    match command {
        Commands::Settings { command } => settings(app, command).await,
        Commands::Documents { command } => documents(app, command).await,
        Commands::Rubrics { command } => rubrics(app, command).await,
        Commands::Grade {
            document_id,
            rubric_id,
        } => grade(app, &document_id, &rubric_id).await,
        Commands::Grading { command } => grading(app, command).await,
    }
}

//=========================================================================================
// Settings
//=========================================================================================

async fn settings(app: &App, command: SettingsCommand) -> Result<(), DashboardError> {
    match command {
        SettingsCommand::Show => {
            let token = app.settings.resolved_api_token();
            let org = app.settings.resolved_organization_id();
            let base = app.settings.resolved_api_base_url();
            println!("API token:        {:<40} [{}]", mask(&token.value), source_label(token.source));
            println!("Organization id:  {:<40} [{}]", display_or_unset(&org.value), source_label(org.source));
            println!("API base URL:     {:<40} [{}]", display_or_unset(&base.value), source_label(base.source));
            Ok(())
        }
        SettingsCommand::Set(SetArgs {
            token,
            org_id,
            api_base_url,
        }) => {
            if token.is_none() && org_id.is_none() && api_base_url.is_none() {
                println!("Nothing to change; pass --token, --org-id, or --api-base-url.");
                return Ok(());
            }
            if let Some(token) = token {
                app.settings.set_api_token(&token)?;
            }
            if let Some(org_id) = org_id {
                app.settings.set_organization_id(&org_id)?;
            }
            if let Some(url) = api_base_url {
                app.settings.set_api_base_url(&url)?;
            }
            println!("Settings saved.");
            Ok(())
        }
        SettingsCommand::Test => {
            let organization_id = app.settings.organization_id();
            if test_connection(app.api.as_ref(), &organization_id).await {
                println!("Connection successful!");
                Ok(())
            } else {
                println!("Connection failed. Check your settings.");
                std::process::exit(1);
            }
        }
    }
}

fn source_label(source: CredentialSource) -> &'static str {
    match source {
        CredentialSource::Override => "saved override",
        CredentialSource::Environment => "environment",
        CredentialSource::Default => "built-in default",
        CredentialSource::Unset => "not set",
    }
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() {
        "(not set)"
    } else {
        "********"
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

//=========================================================================================
// Documents
//=========================================================================================

async fn documents(app: &App, command: DocumentsCommand) -> Result<(), DashboardError> {
    match command {
        DocumentsCommand::Upload { paths } => {
            let uploads = paths.iter().map(|path| upload_one(app, path));
            let outcomes = join_all(uploads).await;

            let mut failures = 0;
            for (path, outcome) in paths.iter().zip(outcomes) {
                match outcome {
                    Ok(document) => println!("Uploaded {} -> {}", path.display(), document.id),
                    Err(e) => {
                        failures += 1;
                        eprintln!("Failed to upload {}: {}", path.display(), e);
                    }
                }
            }
            if failures > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        DocumentsCommand::List { filter } => {
            let page = app.documents.fetch_all().await?;
            let needle = filter.map(|f| f.to_lowercase());
            let mut shown = 0;
            for document in &page.documents {
                if let Some(needle) = &needle {
                    if !document.name.to_lowercase().contains(needle) {
                        continue;
                    }
                }
                println!(
                    "{}  {:<10}  {:>10}  {}  {}",
                    document.id,
                    document.status.to_string(),
                    format_size(document.size),
                    document.created_at.format("%Y-%m-%d %H:%M"),
                    document.name
                );
                shown += 1;
            }
            println!("{} document(s)", shown);
            Ok(())
        }
        DocumentsCommand::Show { id } => {
            // The detail page loads the document and the rubric list side
            // by side, so the teacher can pick one to grade with.
            let (document, rubrics) =
                tokio::join!(app.documents.fetch_one(&id), app.rubrics.fetch_all());
            let document = document?;
            println!("{}", document.name);
            println!("Id:           {}", document.id);
            println!("Status:       {}", document.status);
            println!("Content type: {}", document.content_type);
            println!("Size:         {}", format_size(document.size));
            println!("Uploaded:     {}", document.created_at.format("%Y-%m-%d %H:%M"));
            match rubrics {
                Ok(rubrics) if !rubrics.is_empty() => {
                    println!();
                    println!("Rubrics available for grading:");
                    for rubric in &rubrics {
                        println!("  {}  {}", rubric.id, rubric.name);
                    }
                }
                Ok(_) => {}
                Err(_) => println!("(rubric list unavailable)"),
            }
            Ok(())
        }
    }
}

async fn upload_one(app: &App, path: &Path) -> Result<Document, DashboardError> {
    let content = fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DashboardError::Internal(format!("Invalid file name: {}", path.display()))
        })?;
    let document = app
        .documents
        .upload(file_name, content_type_for(path), Bytes::from(content))
        .await?;
    Ok(document)
}

/// Mirrors the accept map of the upload surface.
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

//=========================================================================================
// Rubrics
//=========================================================================================

async fn rubrics(app: &App, command: RubricsCommand) -> Result<(), DashboardError> {
    match command {
        RubricsCommand::List { filter } => {
            let rubrics = app.rubrics.fetch_all().await?;
            let needle = filter.map(|f| f.to_lowercase());
            let mut shown = 0;
            for rubric in &rubrics {
                if let Some(needle) = &needle {
                    if !rubric.name.to_lowercase().contains(needle)
                        && !rubric.description.to_lowercase().contains(needle)
                    {
                        continue;
                    }
                }
                println!(
                    "{}  {}  (updated {})",
                    rubric.id,
                    rubric.name,
                    rubric.updated_at.format("%Y-%m-%d")
                );
                shown += 1;
            }
            println!("{} rubric(s)", shown);
            Ok(())
        }
        RubricsCommand::Show { id } => {
            let rubric = app.rubrics.fetch_one(&id).await?;
            println!("{}", rubric.name);
            println!("Id:      {}", rubric.id);
            println!("Created: {}", rubric.created_at.format("%Y-%m-%d"));
            println!();
            println!("{}", rubric.description);
            println!();
            println!("{}", rubric.prompt);
            Ok(())
        }
        RubricsCommand::New {
            name,
            description,
            prompt,
        } => {
            let draft = RubricDraft {
                name,
                description,
                prompt,
            };
            let rubric = app.rubrics.create(&draft).await?;
            println!("Created rubric {}", rubric.id);
            Ok(())
        }
        RubricsCommand::Edit {
            id,
            name,
            description,
            prompt,
        } => {
            // The editor pre-fills current values; omitted flags keep them.
            let current = app.rubrics.fetch_one(&id).await?;
            let draft = RubricDraft {
                name: name.unwrap_or(current.name),
                description: description.unwrap_or(current.description),
                prompt: prompt.unwrap_or(current.prompt),
            };
            let rubric = app.rubrics.update(&id, &draft).await?;
            println!("Updated rubric {}", rubric.id);
            Ok(())
        }
    }
}

//=========================================================================================
// Grading
//=========================================================================================

async fn grade(app: &App, document_id: &str, rubric_id: &str) -> Result<(), DashboardError> {
    let result = app.grading.grade(document_id, rubric_id).await?;
    println!(
        "Submitted for grading; result {} is {}",
        result.id, result.status
    );
    Ok(())
}

async fn grading(app: &App, command: GradingCommand) -> Result<(), DashboardError> {
    match command {
        GradingCommand::Show { id } => {
            let result = app.grading.fetch_one(&id).await?;
            println!("Result {}  [{}]", result.id, result.status);
            println!("Document: {}", result.document_id);
            println!("Rubric:   {}", result.schema_id);
            if let Some(score) = result.score {
                println!("Score:    {}", score);
            }
            if let Some(feedback) = &result.teacher_feedback {
                println!();
                println!("Teacher feedback:");
                println!("{}", feedback);
            }
            println!();
            println!("AI feedback:");
            let pretty = serde_json::to_string_pretty(&result.ai_feedback)
                .unwrap_or_else(|_| result.ai_feedback.to_string());
            println!("{}", pretty);
            Ok(())
        }
        GradingCommand::Review {
            id,
            feedback,
            score,
        } => {
            let result = app.grading.review(&id, &feedback, score).await?;
            println!("Feedback recorded on {}", result.id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_the_accept_map() {
        assert_eq!(content_type_for(Path::new("essay.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("ESSAY.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            content_type_for(Path::new("report.docx")),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(
            content_type_for(Path::new("mystery.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn sizes_render_in_sensible_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
