use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create both databases and their schemas if missing.
    Init,
    /// Source, mapping and audit counts.
    Status,
    /// Query the sync audit log.
    Audit(AuditArgs),
    /// Compare source, mappings and target; optionally replay failures.
    Reconcile(ReconcileArgs),
    /// Re-dispatch existing entities through their handlers.
    Resync {
        #[command(subcommand)]
        action: ResyncCommands,
    },
    /// Print the JSON Schema of an output type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Operation tag (sync-org, delete-org, sync-user, delete-user)
    #[arg(long)]
    pub operation: Option<String>,

    /// Source record id
    #[arg(long)]
    pub record_id: Option<String>,

    /// Outcome (success, failure)
    #[arg(long)]
    pub result: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ReconcileArgs {
    /// Re-run every attempt whose latest audit entry is a failure
    #[arg(long)]
    pub replay: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum ResyncCommands {
    /// Resync one organization.
    Org { id: String },
    /// Resync one user.
    User { id: String },
    /// Resync every user whose primary team is this team.
    Team { id: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    AuditEntry,
    Mapping,
    SyncReport,
    SyncStatus,
    DriftReport,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}
