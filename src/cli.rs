use clap::{Parser, Subcommand};
use inked_common::Tier;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inked")]
#[command(about = "Inked Ghost-Writer: テンプレートからAIで文章・画像を生成", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テンプレート一覧を表示
    Templates,

    /// テンプレートから生成
    Generate {
        /// テンプレートID（例: letter, story, image）
        #[arg(required = true)]
        template: String,

        /// 入力値（name=value、複数指定可）
        #[arg(short = 'f', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// 対話式で入力
        #[arg(short, long)]
        interactive: bool,

        /// 生成結果をプロジェクトとして保存
        #[arg(long)]
        save: bool,

        /// 保存時のタイトル
        #[arg(short, long)]
        title: Option<String>,

        /// 結果をファイルへ書き出す（画像はPNG）
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// 保存済みプロジェクト一覧（新しい順）
    Projects,

    /// プロジェクトの詳細を表示
    Show {
        /// プロジェクトID
        #[arg(required = true)]
        id: String,
    },

    /// プロフィールの表示・事業者名の変更
    Profile {
        /// 事業者名（ブランド系テンプレートに事前入力される）
        #[arg(long)]
        business_name: Option<String>,
    },

    /// プランを変更（free/pro/executive）
    Subscribe {
        #[arg(value_parser = parse_tier)]
        tier: Tier,
    },

    /// 設定管理
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// ユーザーIDを設定
        #[arg(long)]
        set_user: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `name=value` を分解（値には '=' を含めてよい）
pub fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("name=value 形式で指定してください: {}", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("項目名が空です: {}", s));
    }
    Ok((name.to_string(), value.to_string()))
}

pub fn parse_tier(s: &str) -> Result<Tier, String> {
    s.parse::<Tier>().map_err(|e| e.to_string())
}
