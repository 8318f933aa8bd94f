//! Subcommand handlers.
//!
//! Input is validated here before it reaches a repository; repositories do
//! not re-check title, content, or tag limits.

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::info;

use chainnote_db::defaults::MAX_TAGS_PER_NOTE;
use chainnote_db::{
    create_pool_with_config, detect_schema_profile, log_pool_metrics, run_migrations, ChainAnnotation,
    CreateNoteRequest, CreateUserRequest, Database, Error, LinkWalletRequest,
    NotebookRepository, TagRepository, TrashFilter, UpdateNoteRequest, UserRepository,
};

use crate::config::CliConfig;
use crate::{ChainArgs, Cli, Commands, NoteCommand, NotebookCommand, TagCommand, UserCommand};

pub async fn run(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let pool = create_pool_with_config(&config.database_url, config.pool_config())
        .await
        .context("connecting to database")?;
    log_pool_metrics(&pool);

    match cli.command {
        Commands::Schema => {
            let profile = detect_schema_profile(&pool).await?;
            print_json(&profile)
        }
        Commands::Migrate => {
            run_migrations(&pool).await?;
            let profile = detect_schema_profile(&pool).await?;
            info!(
                subsystem = "cli",
                op = "migrate",
                schema_mode = %profile.mode,
                "Migrations applied"
            );
            print_json(&profile)
        }
        Commands::Notes(cmd) => {
            let db = Database::new(pool).await?;
            notes(&db, require_user(cli.user)?, cmd).await
        }
        Commands::Notebooks(cmd) => {
            let db = Database::new(pool).await?;
            require_multi_tenant(&db, "notebooks")?;
            notebooks(&db, require_user(cli.user)?, cmd).await
        }
        Commands::Tags(cmd) => {
            let db = Database::new(pool).await?;
            require_multi_tenant(&db, "tags")?;
            tags(&db, require_user(cli.user)?, cmd).await
        }
        Commands::Users(cmd) => {
            let db = Database::new(pool).await?;
            users(&db, cmd).await
        }
    }
}

fn require_user(user: Option<i64>) -> anyhow::Result<i64> {
    user.ok_or_else(|| anyhow!("--user (or CHAINNOTE_USER_ID) is required for this command"))
}

/// Notebooks and tags hang off owned notes; the simple schema has neither.
fn require_multi_tenant(db: &Database, what: &str) -> anyhow::Result<()> {
    if !db.profile.is_multi_tenant() {
        bail!(
            "{} need the multi-tenant schema; detected {}",
            what,
            db.profile.mode
        );
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn found<T>(value: Option<T>, what: &str, id: i64) -> anyhow::Result<T> {
    value.ok_or_else(|| Error::NotFound(format!("{} {} not found", what, id)).into())
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Reject tag lists over the per-note limit instead of silently truncating.
fn validate_tags(tags: &[String]) -> chainnote_db::Result<()> {
    let count = tags.iter().filter(|t| !t.trim().is_empty()).count();
    if count > MAX_TAGS_PER_NOTE {
        return Err(Error::InvalidInput(format!(
            "at most {} tags per note, got {}",
            MAX_TAGS_PER_NOTE, count
        )));
    }
    Ok(())
}

fn chain_annotation(args: ChainArgs) -> chainnote_db::Result<ChainAnnotation> {
    let chain_metadata: Option<serde_json::Value> = args
        .chain_metadata
        .as_deref()
        .map(|raw| serde_json::from_str(raw))
        .transpose()
        .map_err(|e| Error::InvalidInput(format!("chain metadata is not valid JSON: {}", e)))?;

    Ok(ChainAnnotation {
        tx_hash: args.tx_hash,
        tx_status: args.tx_status,
        cardano_address: args.cardano_address,
        chain_action: args.chain_action,
        chain_label: args.chain_label,
        chain_metadata,
    })
}

fn build_create(
    title: String,
    content: String,
    notebook_id: Option<i64>,
    tags: Vec<String>,
    chain: ChainArgs,
) -> chainnote_db::Result<CreateNoteRequest> {
    let req = CreateNoteRequest {
        title,
        content,
        notebook_id,
        tags,
        chain: chain_annotation(chain)?,
    };
    req.validate()?;
    validate_tags(&req.tags)?;
    Ok(req)
}

fn build_update(
    title: String,
    content: String,
    notebook_id: Option<i64>,
    tags: Vec<String>,
    clear_tags: bool,
    chain: ChainArgs,
) -> chainnote_db::Result<UpdateNoteRequest> {
    let tags = if clear_tags {
        Some(Vec::new())
    } else if tags.is_empty() {
        None
    } else {
        validate_tags(&tags)?;
        Some(tags)
    };

    let req = UpdateNoteRequest {
        title,
        content,
        notebook_id,
        tags,
        chain: chain_annotation(chain)?,
    };
    req.validate()?;
    Ok(req)
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn notes(db: &Database, user: i64, cmd: NoteCommand) -> anyhow::Result<()> {
    match cmd {
        NoteCommand::List {
            include_deleted,
            only_deleted,
        } => {
            let filter = TrashFilter::from_flags(include_deleted, only_deleted);
            print_json(&db.notes.list(user, filter).await?)
        }
        NoteCommand::Show { id } => print_json(&found(db.notes.get(user, id).await?, "Note", id)?),
        NoteCommand::Create {
            title,
            content,
            notebook,
            tags,
            chain,
        } => {
            let req = build_create(title, content, notebook, tags, chain)?;
            let note = db.notes.create(user, req).await?;
            info!(
                subsystem = "cli",
                op = "note_create",
                user_id = user,
                note_id = note.id,
                tag_count = note.tags.len(),
                "Note created"
            );
            print_json(&note)
        }
        NoteCommand::Update {
            id,
            title,
            content,
            notebook,
            tags,
            clear_tags,
            chain,
        } => {
            let req = build_update(title, content, notebook, tags, clear_tags, chain)?;
            print_json(&found(db.notes.update(user, id, req).await?, "Note", id)?)
        }
        NoteCommand::Delete { id } => {
            print_json(&found(db.notes.soft_delete(user, id).await?, "Note", id)?)
        }
        NoteCommand::Restore { id } => {
            let restored = db.notes.restore(user, id).await?;
            if restored.is_none() && !db.profile.soft_delete {
                bail!("this database has no trash; deleted notes cannot be restored");
            }
            print_json(&found(restored, "Deleted note", id)?)
        }
        NoteCommand::Purge { id } => {
            let id = found(db.notes.hard_delete(user, id).await?, "Note", id)?;
            print_json(&serde_json::json!({ "id": id, "purged": true }))
        }
    }
}

async fn notebooks(db: &Database, user: i64, cmd: NotebookCommand) -> anyhow::Result<()> {
    match cmd {
        NotebookCommand::List => print_json(&db.notebooks.list(user).await?),
        NotebookCommand::Create { name } => print_json(&db.notebooks.create(user, &name).await?),
        NotebookCommand::Rename { id, name } => print_json(&found(
            db.notebooks.rename(user, id, &name).await?,
            "Notebook",
            id,
        )?),
        NotebookCommand::Delete { id } => {
            print_json(&found(db.notebooks.delete(user, id).await?, "Notebook", id)?)
        }
    }
}

async fn tags(db: &Database, user: i64, cmd: TagCommand) -> anyhow::Result<()> {
    match cmd {
        TagCommand::List => print_json(&db.tags.list(user).await?),
        TagCommand::Create { name } => print_json(&db.tags.create(user, &name).await?),
        TagCommand::Rename { id, name } => {
            print_json(&found(db.tags.rename(user, id, &name).await?, "Tag", id)?)
        }
        TagCommand::Delete { id } => print_json(&found(db.tags.delete(user, id).await?, "Tag", id)?),
    }
}

async fn users(db: &Database, cmd: UserCommand) -> anyhow::Result<()> {
    match cmd {
        UserCommand::Create {
            username,
            email,
            password_hash,
        } => {
            if username.trim().is_empty() || !email.contains('@') {
                return Err(Error::InvalidInput(
                    "username is required and email must contain '@'".to_string(),
                )
                .into());
            }
            let user = db
                .users
                .create(CreateUserRequest {
                    username,
                    email,
                    password_hash,
                })
                .await?;
            print_json(&user)
        }
        UserCommand::Show { id, email } => {
            let user = match (id, email) {
                (Some(id), _) => found(db.users.get(id).await?, "User", id)?,
                (None, Some(email)) => db
                    .users
                    .find_by_email(&email)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("User {} not found", email)))?,
                (None, None) => bail!("--id or --email is required"),
            };
            print_json(&user)
        }
        UserCommand::LinkWallet {
            id,
            address,
            network,
            label,
        } => {
            let req = LinkWalletRequest {
                address,
                label,
                network,
            };
            print_json(&found(db.users.link_wallet(id, req).await?, "User", id)?)
        }
        UserCommand::UnlinkWallet { id } => {
            print_json(&found(db.users.unlink_wallet(id).await?, "User", id)?)
        }
    }
}
