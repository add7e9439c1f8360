// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! EduSMS - SMS billing core for education centers.
//!
//! This is the binary entry point. It loads configuration, opens the store,
//! and runs one operation per invocation, printing the result as JSON.

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use edusms_config::EduSmsConfig;

/// EduSMS - SMS billing core for education centers.
#[derive(Parser, Debug)]
#[command(name = "edusms", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Identity of the staff member running the command.
#[derive(Args, Debug, Clone)]
struct CallerArgs {
    /// Company the caller acts for.
    #[arg(long)]
    company: Option<i64>,
    #[arg(long, default_value = "cli")]
    user_id: String,
    #[arg(long, default_value = "Command line")]
    user_name: String,
}

#[derive(Args, Debug, Clone, Copy)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    size: u32,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the alphabet and billed segment count of a text.
    Segments { text: String },
    /// Render a stored template for a student and/or group.
    Render {
        #[command(flatten)]
        caller: CallerArgs,
        /// Template id.
        template_id: i64,
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        group: Option<i64>,
        #[arg(long)]
        teacher: Option<String>,
        /// Amount substituted for (SUM).
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Credit a company's balance with purchased segments.
    Credit {
        company_id: i64,
        segments: i64,
        #[arg(long, default_value_t = 0.0)]
        sum_paid: f64,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Delete a payment transaction and take its segments back.
    Reverse { transaction_id: String },
    /// Print a company's current balance.
    Balance { company_id: i64 },
    /// List payment transactions of a company, newest first.
    Transactions {
        company_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List the usage log of the caller's company.
    Logs {
        #[command(flatten)]
        caller: CallerArgs,
        /// Only show messages sent to this student.
        #[arg(long)]
        student: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List templates of one type (ACTION or TEMPLATE).
    Templates {
        #[command(flatten)]
        caller: CallerArgs,
        #[arg(long = "type", default_value = "TEMPLATE")]
        template_type: String,
    },
    /// Create a template, or edit one with --id.
    SetTemplate {
        #[command(flatten)]
        caller: CallerArgs,
        text: String,
        #[arg(long)]
        id: Option<i64>,
        #[arg(long = "type", default_value = "TEMPLATE")]
        template_type: String,
        #[arg(long)]
        action_type: Option<String>,
        #[arg(long, default_value_t = 0)]
        resend_count: i32,
    },
    /// Send a message to a student and bill it.
    Send {
        #[command(flatten)]
        caller: CallerArgs,
        student_id: String,
        message: String,
    },
    /// Check configuration, storage and vendor health.
    Doctor {
        /// Also run a full database integrity check.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => edusms_config::load_and_validate_path(path),
        None => edusms_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            edusms_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let Some(command) = cli.command else {
        println!("edusms: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, &config).await {
        eprintln!("edusms: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &EduSmsConfig) -> Result<(), edusms_core::EduSmsError> {
    match command {
        Commands::Segments { text } => commands::segments(&text),
        Commands::Doctor { deep, plain } => doctor::run_doctor(config, deep, plain).await,
        other => {
            let app = commands::App::open(config).await?;
            let result = dispatch(&app, other).await;
            app.close().await?;
            result
        }
    }
}

async fn dispatch(app: &commands::App, command: Commands) -> Result<(), edusms_core::EduSmsError> {
    match command {
        Commands::Render {
            caller,
            template_id,
            student,
            group,
            teacher,
            amount,
        } => {
            let render_ctx = edusms_billing::RenderContext {
                student_id: student,
                group_id: group,
                teacher_name: teacher,
                amount,
            };
            app.render(&caller.into(), template_id, &render_ctx).await
        }
        Commands::Credit {
            company_id,
            segments,
            sum_paid,
            comment,
        } => {
            app.credit(&edusms_service::AddSmsRequest {
                company_id,
                comment,
                sum_paid,
                segments,
            })
            .await
        }
        Commands::Reverse { transaction_id } => app.reverse(&transaction_id).await,
        Commands::Balance { company_id } => app.balance(company_id).await,
        Commands::Transactions { company_id, page } => {
            app.transactions(company_id, page.into()).await
        }
        Commands::Logs {
            caller,
            student,
            page,
        } => app.logs(&caller.into(), student.as_deref(), page.into()).await,
        Commands::Templates {
            caller,
            template_type,
        } => {
            let template_type = commands::parse_template_type(&template_type)?;
            app.templates(&caller.into(), template_type).await
        }
        Commands::SetTemplate {
            caller,
            text,
            id,
            template_type,
            action_type,
            resend_count,
        } => {
            let request = edusms_service::SetTemplateRequest {
                id,
                text,
                action_type,
                template_type: commands::parse_template_type(&template_type)?,
                resend_count,
            };
            app.set_template(&caller.into(), &request).await
        }
        Commands::Send {
            caller,
            student_id,
            message,
        } => {
            app.send(
                &caller.into(),
                &edusms_service::SendSmsDirectlyRequest {
                    student_id,
                    message,
                },
            )
            .await
        }
        Commands::Segments { .. } | Commands::Doctor { .. } => Ok(()),
    }
}

impl From<CallerArgs> for edusms_core::types::CallerContext {
    fn from(args: CallerArgs) -> Self {
        Self {
            company_id: args.company,
            user_id: args.user_id,
            user_name: args.user_name,
        }
    }
}

impl From<PageArgs> for edusms_core::types::PageRequest {
    fn from(args: PageArgs) -> Self {
        Self::new(args.page, args.size)
    }
}

/// Initialize the tracing subscriber with an env-filter on stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("edusms={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
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
    fn binary_loads_config_defaults() {
        let config = edusms_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.service.name, "edusms");
    }

    #[test]
    fn send_parses_caller_flags() {
        let cli = Cli::parse_from([
            "edusms", "send", "--company", "4", "--user-id", "u-9", "stu-1", "Hello",
        ]);
        let Some(Commands::Send {
            caller,
            student_id,
            message,
        }) = cli.command
        else {
            panic!("expected send");
        };
        let ctx: edusms_core::types::CallerContext = caller.into();
        assert_eq!(ctx.company_id, Some(4));
        assert_eq!(ctx.user_id, "u-9");
        assert_eq!(student_id, "stu-1");
        assert_eq!(message, "Hello");
    }

    #[test]
    fn caller_without_company_has_none() {
        let cli = Cli::parse_from(["edusms", "logs"]);
        let Some(Commands::Logs { caller, page, .. }) = cli.command else {
            panic!("expected logs");
        };
        assert_eq!(caller.company, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.size, 20);
    }
}
