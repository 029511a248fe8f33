use anyhow::{bail, Context};
use clap::Parser;
use prescription_scanner::api::ApiClient;
use prescription_scanner::cli::{Cli, Commands};
use prescription_scanner::config::{self, Config, UrlSource, ENV_FILES};
use prescription_scanner::screens::{self, processing, results, upload};
use prescription_scanner::logging;
use prescription_scanner_common::{
    validate_base_url, Session, TransitionDelays, API_URL_VAR,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let saved = Config::load().context("failed to load saved config")?;
    let cwd = std::env::current_dir()?;
    let resolved = config::resolve_api_url(cli.api_url.as_deref(), &saved, &cwd);
    tracing::debug!(url = %resolved.url, source = %resolved.source, "api url resolved");

    match cli.command {
        Commands::Scan { image, load_model, raw, output, no_delay } => {
            println!("💊 rx-scan - Prescription Scanner\n");

            let mode = if load_model {
                upload::ModelLoadMode::Always
            } else if std::io::stdin().is_terminal() {
                upload::ModelLoadMode::Ask
            } else {
                upload::ModelLoadMode::Never
            };
            let delays = if no_delay {
                TransitionDelays::none()
            } else {
                TransitionDelays::default()
            };

            let mut session = Session::new(validate_base_url(&resolved.url));
            let client = ApiClient::new(&resolved.url);
            screens::print_notifications(&mut session);

            if !session.config_valid() {
                println!("\nRun `rx-scan config --check` for details.");
                bail!("invalid configuration");
            }

            // 1. upload画面
            println!("[1/3] Connecting to {}", resolved.url);
            upload::prepare(&mut session, &client, mode, &upload::ModelSelection::default(), true).await?;
            screens::print_notifications(&mut session);

            if !session.can_accept_file() {
                println!("\nThe model must be loaded before scanning (try `rx-scan scan --load-model`).");
                bail!("backend not ready");
            }
            println!("✔ Server ready\n");

            let one_shot = image.is_some();
            loop {
                let path = match &image {
                    Some(path) => path.clone(),
                    None => upload::prompt_path()?,
                };

                match upload::select(&mut session, &path) {
                    Ok(true) => {}
                    Ok(false) => {
                        screens::print_notifications(&mut session);
                        if one_shot {
                            bail!("file rejected");
                        }
                        continue;
                    }
                    Err(e) if one_shot => return Err(e.into()),
                    Err(e) => {
                        println!("✖ {}", e);
                        continue;
                    }
                }

                // 2. processing画面
                println!("[2/3] Processing {}", path.display());
                let outcome = processing::run(&mut session, &client, delays, true).await;
                screens::print_notifications(&mut session);

                // 3. results画面
                if outcome == processing::Outcome::Completed {
                    println!("\n[3/3] Results\n");
                    print!("{}", results::render(&session, raw));
                    if let Some(output) = &output {
                        let output = output_path(output, &path, one_shot);
                        if results::save_response(&session, &output)? {
                            println!("\n✔ Saved: {}", output.display());
                        }
                    }
                } else if one_shot {
                    bail!("scan failed");
                }

                if one_shot || !ask_scan_another()? {
                    break;
                }
                session.scan_another();
                println!();
            }
        }

        Commands::Health => {
            let client = ApiClient::new(&resolved.url);
            let health = client.health().await?;
            println!("Server: {}", resolved.url);
            println!("  Status:       {}", health.status);
            println!("  Message:      {}", health.message);
            println!(
                "  Model loaded: {}",
                if health.model_loaded { "yes" } else { "no" }
            );
            if let Some(device) = &health.device {
                println!("  Device:       {}", device);
            }
            if let Some(cuda) = health.cuda_available {
                println!("  CUDA:         {}", if cuda { "available" } else { "unavailable" });
            }
        }

        Commands::LoadModel { base_model, adapter_repo } => {
            let client = ApiClient::new(&resolved.url);
            println!("Loading {} + {} ...", base_model, adapter_repo);
            let resp = client.load_model(&base_model, &adapter_repo).await?;
            if resp.success {
                println!("✔ {}", resp.message);
            } else {
                bail!("model load failed: {}", resp.message);
            }
        }

        Commands::Config { set_api_url, show, check } => {
            let mut saved = saved;

            if let Some(url) = set_api_url {
                let validation = validate_base_url(&url);
                for error in &validation.errors {
                    println!("✖ {}", error);
                }
                if !validation.is_valid() {
                    bail!("refusing to save an invalid URL");
                }
                saved.set_api_url(url)?;
                println!("✔ API URL saved: {}", Config::config_path()?.display());
            }

            if show {
                println!("Settings:");
                println!(
                    "  Saved API URL: {}",
                    saved.api_base_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  Effective:     {} [{}]",
                    if resolved.url.is_empty() { "(not set)" } else { resolved.url.as_str() },
                    resolved.source
                );
            }

            if check {
                print_check(&cwd, &resolved.url, &resolved.source);
            }
        }
    }

    Ok(())
}

fn ask_scan_another() -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt("Scan another prescription?")
        .default(true)
        .interact()?)
}

/// 連続スキャン時は画像名ごとに出力ファイルを分ける
fn output_path(output: &Path, image: &Path, one_shot: bool) -> PathBuf {
    if one_shot || !output.is_dir() {
        return output.to_path_buf();
    }
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "result".to_string());
    output.join(format!("{}.json", stem))
}

fn print_check(dir: &Path, url: &str, source: &UrlSource) {
    println!("🔍 Checking configuration...\n");

    for file in ENV_FILES {
        let path = dir.join(file);
        if path.exists() {
            println!("✅ Found {}", file);
        }
    }
    println!("   {} from: {}\n", API_URL_VAR, source);

    let validation = validate_base_url(url);
    if validation.is_valid() {
        println!("✅ {}", url);
    }
    for error in &validation.errors {
        println!("❌ {}", error);
    }
    for warning in &validation.warnings {
        println!("⚠️  {}", warning);
    }

    println!("\n{}", "=".repeat(50));
    if validation.is_valid() && validation.warnings.is_empty() {
        println!("✅ All checks passed! Configuration looks good.");
    } else if validation.is_valid() {
        println!("⚠️  Configuration is usable, but review the warnings above.");
    } else {
        println!("❌ Configuration is invalid.");
        println!("   Set {} in the environment, a .env.local file,", API_URL_VAR);
        println!("   or with `rx-scan config --set-api-url https://your-backend`.");
    }
    println!("{}", "=".repeat(50));
}
