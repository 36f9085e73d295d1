use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::events::Event;
use crate::schedule::ZONE_CODES;
use crate::session::{ClaimReply, ConfirmReply, ForceClearReply, ReleaseReply, StatusView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn print_claim_reply(reply: &ClaimReply, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(reply),
        Format::Pretty => {
            match reply {
                ClaimReply::Claimed { tag } => println!("{} claimed {tag}", "ok:".green()),
                ClaimReply::Swapped { from, to } => {
                    println!("{} swapped {from} -> {to}", "ok:".green());
                }
                ClaimReply::NeedsConfirm { from, to, .. } => println!(
                    "swap {from} -> {to} pending — answer with `roster confirm yes` or `roster confirm no`"
                ),
                ClaimReply::BlockedLocked => println!("{} signups are locked", "blocked:".red()),
                ClaimReply::AlreadyHeld { tag, by } => {
                    println!("{} {tag} is held by {by}", "blocked:".red());
                }
                ClaimReply::Ambiguous { candidates } => {
                    println!("ambiguous, could be: {}", candidates.join(", "));
                }
                ClaimReply::NotFound => println!("no matching entry"),
            }
            Ok(())
        }
    }
}

pub fn print_release_reply(reply: &ReleaseReply, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(reply),
        Format::Pretty => {
            match reply {
                ReleaseReply::Released { tag } => println!("{} released {tag}", "ok:".green()),
                ReleaseReply::NotClaimed { tag } => println!("{tag} is not claimed"),
                ReleaseReply::NotOwner { tag, by } => {
                    println!("{} {tag} is held by {by}", "blocked:".red());
                }
                ReleaseReply::Ambiguous { candidates } => {
                    println!("ambiguous, could be: {}", candidates.join(", "));
                }
                ReleaseReply::NotFound => println!("no matching entry"),
            }
            Ok(())
        }
    }
}

pub fn print_confirm_reply(reply: &ConfirmReply, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(reply),
        Format::Pretty => {
            match reply {
                ConfirmReply::Applied { outcome } => {
                    print_claim_reply(outcome, Format::Pretty)?;
                }
                ConfirmReply::Declined { from, to } => {
                    println!("swap {from} -> {to} declined");
                }
                ConfirmReply::Expired => println!("confirmation expired, nothing changed"),
                ConfirmReply::NonePending => println!("nothing pending"),
            }
            Ok(())
        }
    }
}

pub fn print_force_clear_reply(reply: &ForceClearReply, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(reply),
        Format::Pretty => {
            match reply {
                ForceClearReply::Cleared { tag, holder } => {
                    println!("{} cleared {tag} (was {holder})", "ok:".green());
                }
                ForceClearReply::NotClaimed { tag } => println!("{tag} is not claimed"),
            }
            Ok(())
        }
    }
}

pub fn print_status(view: &StatusView, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(view),
        Format::Pretty => {
            let state = if view.locked {
                "signups locked".red().to_string()
            } else {
                "signups open".green().to_string()
            };
            println!("{state} — {}/{} claimed", view.claimed, view.total);
            println!("{}", view.schedule);
            for region in &view.regions {
                println!("\n{}", region.region.bold());
                for entry in &region.entries {
                    let flag = entry.flag.as_deref().unwrap_or("");
                    let holder = entry.holder.as_deref().unwrap_or("unclaimed");
                    println!("  {flag} {} — {} — {holder}", entry.tag, entry.name);
                }
            }
            Ok(())
        }
    }
}

pub fn print_events(events: &[Event], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(&events),
        Format::Pretty => {
            for event in events {
                println!(
                    "{} {}",
                    event.ts.format("%Y-%m-%d %H:%M:%S"),
                    serde_json::to_string(&event.kind)?
                );
            }
            Ok(())
        }
    }
}

pub fn print_zone_codes(format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let map: Vec<serde_json::Value> = ZONE_CODES
                .iter()
                .map(|(code, zone)| serde_json::json!({ "code": code, "zone": zone }))
                .collect();
            print_json(&map)
        }
        Format::Pretty => {
            let mut codes: Vec<_> = ZONE_CODES.to_vec();
            codes.sort_by_key(|(code, _)| *code);
            for (code, zone) in codes {
                println!("{} -> {zone}", code.bold());
            }
            Ok(())
        }
    }
}
