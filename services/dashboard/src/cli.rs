//! services/dashboard/src/cli.rs
//!
//! The command-line surface of the dashboard. Each subcommand maps onto one
//! action a dashboard page exposes; execution lives in `commands.rs`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dashboard",
    version,
    about = "Teacher dashboard over the DocRouter grading API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Inspect or change DocRouter credentials")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    #[command(about = "Upload and browse the organization's documents")]
    Documents {
        #[command(subcommand)]
        command: DocumentsCommand,
    },

    #[command(about = "Manage grading rubrics")]
    Rubrics {
        #[command(subcommand)]
        command: RubricsCommand,
    },

    #[command(about = "Submit a document for grading against a rubric")]
    Grade {
        #[arg(help = "Document id")]
        document_id: String,

        #[arg(help = "Rubric id")]
        rubric_id: String,
    },

    #[command(about = "Inspect and review grading results")]
    Grading {
        #[command(subcommand)]
        command: GradingCommand,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    #[command(about = "Print the resolved credentials and where each came from")]
    Show,

    #[command(about = "Save credential overrides; an empty value clears the override")]
    Set(SetArgs),

    #[command(about = "Check that the saved credentials reach the API")]
    Test,
}

#[derive(Args)]
pub struct SetArgs {
    #[arg(long, help = "API bearer token")]
    pub token: Option<String>,

    #[arg(long, help = "Organization id")]
    pub org_id: Option<String>,

    #[arg(long, help = "API base URL")]
    pub api_base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum DocumentsCommand {
    #[command(about = "Upload one or more files")]
    Upload {
        #[arg(required = true, help = "Files to upload")]
        paths: Vec<PathBuf>,
    },

    #[command(about = "List the organization's documents")]
    List {
        #[arg(long, help = "Only show names containing this text")]
        filter: Option<String>,
    },

    #[command(about = "Show one document and the rubrics available for grading")]
    Show {
        #[arg(help = "Document id")]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum RubricsCommand {
    #[command(about = "List rubrics")]
    List {
        #[arg(long, help = "Only show rubrics whose name or description contains this text")]
        filter: Option<String>,
    },

    #[command(about = "Show one rubric in full")]
    Show {
        #[arg(help = "Rubric id")]
        id: String,
    },

    #[command(about = "Create a rubric")]
    New {
        #[arg(long, help = "Rubric name")]
        name: String,

        #[arg(long, help = "What the rubric is for")]
        description: String,

        #[arg(long, help = "Grading prompt template (at least 50 characters)")]
        prompt: String,
    },

    #[command(about = "Edit a rubric; omitted fields keep their current value")]
    Edit {
        #[arg(help = "Rubric id")]
        id: String,

        #[arg(long, help = "New name")]
        name: Option<String>,

        #[arg(long, help = "New description")]
        description: Option<String>,

        #[arg(long, help = "New grading prompt template")]
        prompt: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GradingCommand {
    #[command(about = "Show a grading result")]
    Show {
        #[arg(help = "Grading result id")]
        id: String,
    },

    #[command(about = "Record teacher feedback on a result")]
    Review {
        #[arg(help = "Grading result id")]
        id: String,

        #[arg(long, help = "Feedback text")]
        feedback: String,

        #[arg(long, help = "Score out of 100")]
        score: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn an_explicitly_empty_value_parses_as_a_clear() {
        let cli = Cli::try_parse_from(["dashboard", "settings", "set", "--token", ""]).unwrap();
        let Commands::Settings {
            command: SettingsCommand::Set(args),
        } = cli.command
        else {
            panic!("expected settings set");
        };
        assert_eq!(args.token.as_deref(), Some(""));
        assert!(args.org_id.is_none());
        assert!(args.api_base_url.is_none());
    }

    #[test]
    fn upload_requires_at_least_one_path() {
        assert!(Cli::try_parse_from(["dashboard", "documents", "upload"]).is_err());
    }
}
