use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageHeadlineError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("OpenAI APIキーが設定されていません。OPENAI_API_KEY を .env に記述するか `image-headline config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("データセットエラー: {0}")]
    Dataset(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImageHeadlineError>;
