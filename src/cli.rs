use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-headline")]
#[command(about = "データセット画像のキャプション生成・見出し推定ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 読み込む .env ファイル（省略時はカレントから探索）
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// データセットを処理して結果JSONを出力
    Run {
        /// データセット名（Hugging Face）
        #[arg(short, long)]
        dataset: Option<String>,

        /// データセットの config 名
        #[arg(long)]
        config_name: Option<String>,

        /// split 名
        #[arg(long)]
        split: Option<String>,

        /// 処理する画像数
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// 出力JSONファイル
        #[arg(short, long, default_value = crate::export::DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// ローカルフォルダをデータセットとして使用
        #[arg(long, conflicts_with = "dataset")]
        local_dir: Option<PathBuf>,

        /// キャプション生成モデル
        #[arg(long)]
        caption_model: Option<String>,

        /// 見出し生成モデル
        #[arg(long)]
        chat_model: Option<String>,

        /// キャプションキャッシュを使用（再生成をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 結果JSONの件数を表示
    Summary {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// OpenAI APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// Hugging Face トークンを設定
        #[arg(long)]
        set_hf_token: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
