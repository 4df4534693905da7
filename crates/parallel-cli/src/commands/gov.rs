//! Governance commands: proposals, votes, progress updates.
//!
//! Read commands work without a PIN. Mutating commands unlock the wallet
//! and sign in to the backend inside the same invocation, so they all
//! accept `--pin`.

use clap::Subcommand;

use parallel_governance::ProposalDraft;
use parallel_types::{TokenKind, UpdateStatus, VoteChoice, Wei};

use crate::context;
use crate::output;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum GovAction {
    /// List all proposals.
    Proposals,
    /// Show one proposal in full.
    Show {
        /// Proposal id.
        id: String,
    },
    /// Submit a new proposal (requires 2000 LUT).
    Create {
        #[arg(long)]
        title: String,
        /// Finance, Operations, Governance, or Other.
        #[arg(long)]
        category: String,
        /// Markdown body.
        #[arg(long)]
        body: String,
        /// Link to an off-platform discussion thread.
        #[arg(long, default_value = "")]
        discussion: String,
        /// Voting close override, unix seconds.
        #[arg(long)]
        end: Option<u64>,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// Vote on an active proposal.
    Vote {
        /// Proposal id.
        id: String,
        /// FOR or AGAINST.
        choice: String,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// Delete a proposal you authored.
    Delete {
        /// Proposal id.
        id: String,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// List progress updates under a proposal.
    Updates {
        /// Proposal id.
        id: String,
    },
    /// Post a progress update under a proposal you authored.
    AddUpdate {
        /// Proposal id.
        id: String,
        /// Planning, In Progress, Delayed, Completed, or Started.
        #[arg(long)]
        status: String,
        /// Markdown body of the note.
        #[arg(long)]
        content: String,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// Rewrite a progress update.
    EditUpdate {
        /// Update id.
        id: String,
        /// Planning, In Progress, Delayed, Completed, or Started.
        #[arg(long)]
        status: String,
        /// Markdown body of the note.
        #[arg(long)]
        content: String,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
    /// Delete a progress update.
    DeleteUpdate {
        /// Update id.
        id: String,
        /// PIN; prompted for when absent.
        #[arg(long)]
        pin: Option<String>,
    },
}

pub async fn run(action: GovAction, opts: &GlobalOpts) -> std::result::Result<(), String> {
    match action {
        GovAction::Proposals => proposals(opts).await,
        GovAction::Show { id } => show(opts, &id).await,
        GovAction::Create {
            title,
            category,
            body,
            discussion,
            end,
            pin,
        } => create(opts, title, category, body, discussion, end, pin).await,
        GovAction::Vote { id, choice, pin } => vote(opts, &id, &choice, pin).await,
        GovAction::Delete { id, pin } => delete(opts, &id, pin).await,
        GovAction::Updates { id } => updates(opts, &id).await,
        GovAction::AddUpdate {
            id,
            status,
            content,
            pin,
        } => add_update(opts, &id, &status, &content, pin).await,
        GovAction::EditUpdate {
            id,
            status,
            content,
            pin,
        } => edit_update(opts, &id, &status, &content, pin).await,
        GovAction::DeleteUpdate { id, pin } => delete_update(opts, &id, pin).await,
    }
}

async fn proposals(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    let proposals = app.proposals().await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&proposals, true);
        return Ok(());
    }

    let headers = &["ID", "TITLE", "CATEGORY", "STATUS", "ENDS"];
    let rows: Vec<Vec<String>> = proposals
        .iter()
        .map(|p| {
            vec![
                output::truncate_id(&p.id),
                truncate_text(&p.title, 40),
                p.category.clone(),
                p.status.to_string(),
                output::fmt_time(p.end_time),
            ]
        })
        .collect();
    output::print_table(headers, &rows, false);

    Ok(())
}

async fn show(opts: &GlobalOpts, id: &str) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    let proposal = app.proposal(id).await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&proposal, true);
        return Ok(());
    }

    output::print_kv("Title", &proposal.title, false);
    output::print_kv("Category", &proposal.category, false);
    output::print_kv("Status", &proposal.status.to_string(), false);
    output::print_kv("Author", &proposal.author, false);
    output::print_kv("Ends", &output::fmt_time(proposal.end_time), false);
    output::print_kv("For", &format!("{} LUT", fmt_lut(&proposal.total_for_raw)), false);
    output::print_kv(
        "Against",
        &format!("{} LUT", fmt_lut(&proposal.total_against_raw)),
        false,
    );
    output::print_kv("Voters", &proposal.total_voters.to_string(), false);
    if let Some(ballot) = &proposal.my_vote {
        output::print_kv("My vote", ballot.choice.as_str(), false);
    }
    if !proposal.description.is_empty() {
        println!();
        println!("{}", proposal.description);
    }

    Ok(())
}

async fn create(
    opts: &GlobalOpts,
    title: String,
    category: String,
    body: String,
    discussion: String,
    end: Option<u64>,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let draft = ProposalDraft {
        title,
        category,
        body,
        discussion,
        end,
    };
    draft.validate().map_err(|e| e.to_string())?;

    let app = context::open_signed_in(opts, pin).await?;
    let proposal = app.create_proposal(&draft).await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&proposal, true);
    } else {
        output::print_success("proposal submitted", false);
        output::print_kv("Id", &proposal.id, false);
    }

    Ok(())
}

async fn vote(
    opts: &GlobalOpts,
    id: &str,
    choice: &str,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let choice = choice.parse::<VoteChoice>().map_err(|e| e.to_string())?;

    let app = context::open_signed_in(opts, pin).await?;
    app.cast_vote(id, choice).await.map_err(|e| e.to_string())?;

    output::print_success(&format!("vote {choice} recorded"), opts.json);
    Ok(())
}

async fn delete(
    opts: &GlobalOpts,
    id: &str,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let app = context::open_signed_in(opts, pin).await?;
    app.delete_proposal(id).await.map_err(|e| e.to_string())?;

    output::print_success("proposal deleted", opts.json);
    Ok(())
}

async fn updates(opts: &GlobalOpts, id: &str) -> std::result::Result<(), String> {
    let app = context::open_app(opts)?;
    let updates = app.proposal_updates(id).await.map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&updates, true);
        return Ok(());
    }

    let headers = &["ID", "STATUS", "POSTED", "CONTENT"];
    let rows: Vec<Vec<String>> = updates
        .iter()
        .map(|u| {
            vec![
                output::truncate_id(&u.id),
                u.status.to_string(),
                u.created_at.map(output::fmt_time).unwrap_or_default(),
                truncate_text(&u.content, 40),
            ]
        })
        .collect();
    output::print_table(headers, &rows, false);

    Ok(())
}

async fn add_update(
    opts: &GlobalOpts,
    id: &str,
    status: &str,
    content: &str,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let status = status.parse::<UpdateStatus>().map_err(|e| e.to_string())?;

    let app = context::open_signed_in(opts, pin).await?;
    let update = app
        .add_proposal_update(id, status, content)
        .await
        .map_err(|e| e.to_string())?;

    if opts.json {
        output::print_value(&update, true);
    } else {
        output::print_success("update posted", false);
        output::print_kv("Id", &update.id, false);
    }

    Ok(())
}

async fn edit_update(
    opts: &GlobalOpts,
    id: &str,
    status: &str,
    content: &str,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let status = status.parse::<UpdateStatus>().map_err(|e| e.to_string())?;

    let app = context::open_signed_in(opts, pin).await?;
    app.edit_proposal_update(id, status, content)
        .await
        .map_err(|e| e.to_string())?;

    output::print_success("update edited", opts.json);
    Ok(())
}

async fn delete_update(
    opts: &GlobalOpts,
    id: &str,
    pin: Option<String>,
) -> std::result::Result<(), String> {
    let app = context::open_signed_in(opts, pin).await?;
    app.delete_proposal_update(id)
        .await
        .map_err(|e| e.to_string())?;

    output::print_success("update deleted", opts.json);
    Ok(())
}

/// Formats a raw wei-denominated decimal string as whole LUT. The
/// backend omits zero tallies, so empty reads as zero.
fn fmt_lut(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Wei::ZERO.format_units(TokenKind::Lut.decimals());
    }
    trimmed
        .parse::<Wei>()
        .map(|w| w.format_units(TokenKind::Lut.decimals()))
        .unwrap_or_else(|_| raw.to_string())
}

/// Truncates display text to `max` characters.
fn truncate_text(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
