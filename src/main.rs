use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use inked::cli::{Cli, Commands};
use inked::config::Config;
use inked::error::Result;
use inked::generator::{preflight, Generator, HttpClient, RetryPolicy};
use inked::persistence::{business_name_change, Gateway, JsonFileStore};
use inked::{console, logging};
use inked_common::{Action, GenerationOutput, Session, Tier};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // すべてのエラーはここでメッセージに変換する
    if let Err(e) = run(cli).await {
        eprintln!("✖ {}", e);
        if e.needs_user_action() {
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}

fn open_gateway(config: &Config) -> Result<Gateway<JsonFileStore>> {
    let store = JsonFileStore::open(&config.store_path()?)?;
    Ok(Gateway::new(store))
}

fn require_user(config: &Config) -> Result<String> {
    config
        .get_user_id()
        .ok_or(inked::error::InkedError::NotAuthenticated)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Templates => {
            print!("{}", console::render_catalog());
        }

        Commands::Generate { template, fields, interactive, save, title, out } => {
            let gateway = open_gateway(&config)?;
            let user_id = config.get_user_id();
            let profile = match &user_id {
                Some(user) => Some(gateway.get_user_profile(user)?),
                None => None,
            };
            let tier = profile.as_ref().map(|p| p.tier).unwrap_or(Tier::Free);

            let mut session = Session::new();
            session.apply(Action::SelectTemplate(template))?;
            if let Some(profile) = &profile {
                session.apply_prefill(profile)?;
            }
            for (field, value) in fields {
                session.apply(Action::SetField { field, value })?;
            }
            if interactive {
                console::fill_form_interactively(&mut session)?;
            }

            let template = session.active_template();

            // 事業者名の入力が確定したらプロフィールへ反映
            if let (Some(user), Some(profile)) = (&user_id, &profile) {
                if template.field("businessName").is_some() {
                    let current = session.active_form()?.get("businessName").unwrap_or_default().to_string();
                    if let Some(name) = business_name_change(profile.business_name.as_deref(), &current) {
                        gateway.update_business_name(user, &name);
                    }
                }
            }

            // プラン・必須項目は通信前に確認（APIキー未設定より先に通知する）
            preflight(template, session.active_form()?, tier)?;

            let client = HttpClient::from_config(&config)?;
            let generator = Generator::new(client, RetryPolicy::from_config(&config));

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("{} を生成中...", template.name));
            spinner.enable_steady_tick(Duration::from_millis(120));
            let outcome = generator.generate_in(&mut session, tier).await;
            spinner.finish_and_clear();
            let output = outcome?;

            match &output {
                GenerationOutput::Text { text } => println!("{}\n", text),
                GenerationOutput::Image { base64 } => {
                    println!("✔ 画像を生成しました ({} bytes, base64)", base64.len());
                    if out.is_none() {
                        println!("  --out FILE.png で保存できます");
                    }
                }
            }

            if let Some(path) = out {
                console::write_output(&output, &path)?;
                println!("✔ 書き出し: {}", path.display());
            }

            if save {
                let form = session.active_form()?.clone();
                let id = gateway.save_project(
                    user_id.as_deref(),
                    template.id,
                    &form,
                    session.result(),
                    title.as_deref(),
                )?;
                println!("✔ プロジェクトを保存しました: {}", id);
            }
        }

        Commands::Projects => {
            let user = require_user(&config)?;
            let gateway = open_gateway(&config)?;
            let mut feed = gateway.list_projects(&user)?;
            if let Some(projects) = feed.next().await {
                print!("{}", console::render_history(projects));
            }
        }

        Commands::Show { id } => {
            let user = require_user(&config)?;
            let gateway = open_gateway(&config)?;
            let project = gateway.get_project(&user, &id)?;
            print!("{}", console::render_detail(&project));
        }

        Commands::Profile { business_name } => {
            let user = require_user(&config)?;
            let gateway = open_gateway(&config)?;
            let profile = gateway.get_user_profile(&user)?;

            if let Some(name) = business_name {
                match business_name_change(profile.business_name.as_deref(), &name) {
                    Some(name) => {
                        gateway.update_business_name(&user, &name);
                        println!("✔ 事業者名を更新しました");
                    }
                    None => println!("事業者名は変更されていません"),
                }
            }

            let profile = gateway.get_user_profile(&user)?;
            println!("プロフィール:");
            println!("  ユーザー: {}", profile.user_id);
            println!("  プラン: {}", profile.tier);
            println!("  事業者名: {}", profile.business_name.as_deref().unwrap_or("未設定"));
        }

        Commands::Subscribe { tier } => {
            let user = require_user(&config)?;
            let gateway = open_gateway(&config)?;
            let profile = gateway.subscribe(&user, tier)?;
            println!("✔ プランを {} に変更しました", profile.tier);
        }

        Commands::Config { set_api_key, set_user, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(user) = set_user {
                config.set_user_id(user)?;
                println!("✔ ユーザーを設定しました");
            }

            if show {
                let store = config
                    .store_path()
                    .unwrap_or_else(|_| PathBuf::from("(不明)"));
                println!("設定:");
                println!("  テキストモデル: {}", config.text_model);
                println!("  画像モデル: {}", config.image_model);
                println!("  最大試行回数: {}", config.max_attempts);
                println!("  ユーザー: {}", config.get_user_id().as_deref().unwrap_or("未設定"));
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
                println!("  保存先: {}", store.display());
            }
        }
    }

    Ok(())
}
