// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reelgrab resolve` command implementation.
//!
//! Runs the engine on one post URL and prints what was found. Media bytes
//! stay in memory; nothing is written to disk.

use std::io::IsTerminal;

use reelgrab_config::ReelgrabConfig;
use reelgrab_core::{MediaKind, MediaResult, Platform, ReelgrabError};
use reelgrab_engine::ResolutionEngine;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// One resolved item, as printed by `--json`.
#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub kind: MediaKind,
    pub size: usize,
    pub file_name: String,
    pub source_url: String,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct ResolveSummary {
    pub url: String,
    pub platform: Platform,
    pub resolved: bool,
    pub resolved_by: Option<String>,
    pub caption: Option<String>,
    pub total_bytes: usize,
    pub items: Vec<ItemSummary>,
}

impl ResolveSummary {
    pub fn new(url: &str, result: &MediaResult) -> Self {
        Self {
            url: url.to_string(),
            platform: result.platform,
            resolved: !result.is_empty(),
            resolved_by: result.resolved_by.clone(),
            caption: result.caption.clone(),
            total_bytes: result.total_bytes(),
            items: result
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| ItemSummary {
                    kind: item.kind(),
                    size: item.len(),
                    file_name: item.file_name(result.platform, i),
                    source_url: item.source_url().to_string(),
                })
                .collect(),
        }
    }
}

/// Format a byte count for humans.
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Run the `reelgrab resolve` command.
///
/// Ctrl-C cancels the in-flight resolution. Returns the summary so the
/// caller can pick the exit code.
pub async fn run_resolve(
    config: &ReelgrabConfig,
    url: &str,
    json: bool,
    plain: bool,
) -> Result<ResolveSummary, ReelgrabError> {
    let engine = ResolutionEngine::from_config(config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let result = engine.resolve_cancellable(url, cancel).await?;
    let summary = ResolveSummary::new(url, &result);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_summary(&summary, use_color);
    }

    Ok(summary)
}

fn print_summary(summary: &ResolveSummary, use_color: bool) {
    println!();
    println!("  reelgrab resolve");
    println!("  {}", "-".repeat(35));
    println!("    URL:      {}", summary.url);
    println!("    Platform: {}", summary.platform);

    if !summary.resolved {
        if use_color {
            use colored::Colorize;
            println!("    Result:   {} {}", "✗".red(), "no media found".red());
        } else {
            println!("    Result:   [FAIL] no media found");
        }
        println!();
        return;
    }

    let count = summary.items.len();
    let via = summary.resolved_by.as_deref().unwrap_or("-");
    if use_color {
        use colored::Colorize;
        println!(
            "    Result:   {} {} item(s), {} (via {})",
            "✓".green(),
            count.to_string().green(),
            format_size(summary.total_bytes),
            via
        );
    } else {
        println!(
            "    Result:   [OK] {count} item(s), {} (via {via})",
            format_size(summary.total_bytes)
        );
    }

    for item in &summary.items {
        println!(
            "      {:<16} {:<6} {:>10}  {}",
            item.file_name,
            item.kind.to_string(),
            format_size(item.size),
            item.source_url
        );
    }

    if let Some(caption) = &summary.caption {
        println!("    Caption:  {caption}");
    }
    println!();
}
