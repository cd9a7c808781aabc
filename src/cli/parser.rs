use crate::feedback::FeedbackCategory;
use clap::{Parser, Subcommand};

/// Command-line interface definition for pixeltracker
#[derive(Parser)]
#[command(
    name = "pixeltracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pixel Tracker companion CLI: settings, feedback, webhooks and calendar",
    long_about = None
)]
pub struct Cli {
    /// Override storage database path (useful for tests or a custom location)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the storage database
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Show, change or reset the stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Send feedback (issue, idea or anything else)
    Feedback {
        /// Feedback category
        #[arg(long = "type", value_enum, default_value_t = FeedbackCategory::Issue)]
        category: FeedbackCategory,

        /// Extra context sent along with the message (repeatable)
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Override the feedback endpoint from the configuration
        #[arg(long = "endpoint", hide = true)]
        endpoint: Option<String>,

        /// Free-text message
        message: String,
    },

    /// Webhook delivery and history
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },

    /// Show the calendar window (six months back, one ahead)
    Calendar {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Print the internal activity log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings
    Show {
        /// Print the raw stored JSON document
        #[arg(long)]
        json: bool,
    },

    /// Change one setting
    ///
    /// Keys: passcode-enabled, passcode, webhook-enabled, webhook-url,
    /// scale-type, reminder-enabled, reminder-time
    Set {
        key: String,
        value: String,
    },

    /// Restore every setting to its default
    Reset {
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum WebhookAction {
    /// Send a test notification to the configured webhook URL
    Test {
        #[arg(long, default_value = "pixeltracker webhook test")]
        message: String,
    },

    /// List recent webhook attempts (newest first)
    History,

    /// Forget the webhook history
    Clear,
}
