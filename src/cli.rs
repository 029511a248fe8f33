use clap::{Parser, Subcommand};
use prescription_scanner_common::{DEFAULT_ADAPTER_REPO, DEFAULT_BASE_MODEL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rx-scan")]
#[command(about = "Prescription scanner client: upload a prescription image and list its medications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドのベースURL（環境変数・.env・保存済み設定より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 処方箋画像をスキャンして薬剤を表示
    Scan {
        /// 画像ファイル（省略時は対話入力し、続けて何枚でもスキャンできる）
        image: Option<PathBuf>,

        /// モデル未ロードなら確認なしでロード
        #[arg(long)]
        load_model: bool,

        /// 抽出された生テキストも表示
        #[arg(long)]
        raw: bool,

        /// 結果JSONの保存先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 画面遷移前の待ちを省略
        #[arg(long)]
        no_delay: bool,
    },

    /// バックエンドの状態を表示
    Health,

    /// モデルをロード
    LoadModel {
        /// ベースモデル
        #[arg(long, default_value = DEFAULT_BASE_MODEL)]
        base_model: String,

        /// アダプタリポジトリ
        #[arg(long, default_value = DEFAULT_ADAPTER_REPO)]
        adapter_repo: String,
    },

    /// 設定を表示/編集
    Config {
        /// ベースURLを保存
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 設定を検証
        #[arg(long)]
        check: bool,
    },
}
