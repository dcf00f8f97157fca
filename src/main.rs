use anyhow::Context;
use clap::Parser;
use image_headline_rust::{analyzer, captioner, cli, config, dataset, export, headline, logging};
use cli::{Cli, Commands};
use config::Config;
use dataset::DatasetSource;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv = config::load_dotenv(cli.env_file.as_deref());
    logging::init_tracing(cli.verbose);
    match dotenv {
        Ok(path) => tracing::debug!(".env を読み込みました: {}", path.display()),
        Err(e) if cli.env_file.is_some() => {
            return Err(e).context(".env ファイルを読み込めません");
        }
        Err(e) => tracing::debug!(".env を読み込めませんでした: {}", e),
    }

    let config = Config::load().context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Run {
            dataset: dataset_name,
            config_name,
            split,
            samples,
            output,
            local_dir,
            caption_model,
            chat_model,
            use_cache,
        } => {
            println!("🖼  image-headline - 見出し生成\n");

            let mut config = config;
            if let Some(v) = dataset_name { config.dataset = v; }
            if let Some(v) = config_name { config.dataset_config = v; }
            if let Some(v) = split { config.split = v; }
            if let Some(v) = samples { config.num_samples = v; }
            if let Some(v) = caption_model { config.caption_model = v; }
            if let Some(v) = chat_model { config.chat_model = v; }

            for warning in config.credential_warnings() {
                tracing::warn!("{}", warning);
            }

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .context("HTTPクライアントを作成できません")?;

            // 1. データセット
            println!("[1/3] データセットを読み込み中...");
            let source: Box<dyn DatasetSource> = match &local_dir {
                Some(dir) => Box::new(dataset::LocalDataset::open(dir)?),
                None => {
                    let mut options =
                        dataset::HubDatasetOptions::new(&config.datasets_base_url, &config.dataset);
                    options.config = config.dataset_config.clone();
                    options.split = config.split.clone();
                    options.token = config.hf_token.clone();
                    Box::new(dataset::HubDataset::new(client.clone(), options))
                }
            };
            println!("✔ {}\n", source.name());

            // 2. キャプション + 見出し
            println!("[2/3] キャプション・見出しを生成中...{}", if use_cache { " (キャッシュ有効)" } else { "" });
            let captioner = captioner::HfInferenceCaptioner::new(
                client.clone(),
                &config.inference_base_url,
                &config.caption_model,
            )
            .with_token(config.hf_token.clone())
            .with_max_image_size(config.max_image_size);

            let headliner = headline::OpenAiHeadliner::new(
                client,
                &config.openai_base_url,
                &config.chat_model,
                &config.system_prompt,
            )
            .with_api_key(config.openai_api_key.clone());

            let options = analyzer::ProcessOptions {
                num_samples: config.num_samples,
                cache_dir: use_cache.then(|| cache_dir_for(&output)),
            };
            let report =
                analyzer::process_images(source.as_ref(), &captioner, &headliner, &options).await?;
            println!("✔ 生成完了\n");

            // 3. 結果保存
            println!("[3/3] 結果を保存中...");
            export::save_results(&output, &report.results)
                .with_context(|| format!("結果を書き込めません: {}", output.display()))?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ {}枚の画像を処理しました", report.results.len());
            if !report.failures.is_empty() {
                println!("  スキップ: {}件", report.failures.len());
            }
            if report.headline_errors > 0 {
                println!("  見出しエラー: {}件", report.headline_errors);
            }
            if use_cache {
                println!("  キャッシュヒット: {}件", report.cache_hits);
            }
        }

        Commands::Summary { input } => {
            let results = export::load_results(&input)
                .with_context(|| format!("結果ファイルを読み込めません: {}", input.display()))?;
            let summary = export::summarize(&results);

            println!("結果: {}", input.display());
            println!("  件数: {}", summary.total);
            println!("  見出しエラー: {}", summary.headline_errors);
        }

        Commands::Config { set_api_key, set_hf_token, show } => {
            // 環境変数を反映しない素の設定を編集する
            let mut stored = Config::load_from(&Config::config_path()?)?;

            if let Some(key) = set_api_key {
                stored.set_api_key(key)?;
                println!("✔ OpenAI APIキーを設定しました");
            }

            if let Some(token) = set_hf_token {
                stored.set_hf_token(token)?;
                println!("✔ Hugging Face トークンを設定しました");
            }

            if show {
                println!("設定:");
                println!("  データセット: {} ({}/{})", config.dataset, config.dataset_config, config.split);
                println!("  サンプル数: {}", config.num_samples);
                println!("  キャプションモデル: {}", config.caption_model);
                println!("  見出しモデル: {}", config.chat_model);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  OpenAI APIキー: {}", if config.openai_api_key.is_some() { "設定済み" } else { "未設定" });
                println!("  HFトークン: {}", if config.hf_token.is_some() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Cache { clear, dir, info } => {
            let target = dir.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = analyzer::CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = analyzer::CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match analyzer::CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

/// キャッシュは出力ファイルと同じフォルダに置く
fn cache_dir_for(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
