//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、遥测层初始化、服务构建与信号处理。结果以 JSON 写入标准输出。

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{error, info};

use starzone::core::error::GalleryError;
use starzone::{AppConfig, GalleryService};

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 首页最新图集
    Latest,
    /// 按首字母浏览
    Letter {
        letter: String,
    },
    /// 条目详情 (先预热首页与可选的字母索引)
    Actress {
        id: String,
        #[arg(short, long)]
        letter: Option<String>,
    },
    /// 条目的相关相册
    Albums {
        id: String,
        #[arg(short, long)]
        letter: Option<String>,
    },
    /// 相册内全部原图
    Album {
        url: String,
    },
    /// 在已加载的列表中按名字搜索
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(short, long)]
        letter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 遥测层初始化 (Telemetry Layer Initialization)
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let service = GalleryService::new(config)?;

    // 信号处理与优雅退出 (Signal Handling)
    let shutdown = service.shutdown().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("收到中断信号，正在取消查询...");
            shutdown.cancel();
        }
    });

    match run(&service, cli.command).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            let body = json!({
                "error": e.kind().as_ref(),
                "status": e.status().as_u16(),
                "message": e.public_message(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

async fn run(service: &GalleryService, command: Commands) -> Result<Value, GalleryError> {
    let value = match command {
        Commands::Latest => serde_json::to_value(service.latest().await?)?,
        Commands::Letter { letter } => serde_json::to_value(service.browse_by_letter(&letter).await?)?,
        Commands::Actress { id, letter } => {
            warm(service, letter.as_deref()).await?;
            serde_json::to_value(service.actress_detail(&id).await?)?
        }
        Commands::Albums { id, letter } => {
            warm(service, letter.as_deref()).await?;
            serde_json::to_value(service.actress_albums(&id).await?)?
        }
        Commands::Album { url } => serde_json::to_value(service.album_photos(&url).await?)?,
        Commands::Search { query, limit, letter } => {
            warm(service, letter.as_deref()).await?;
            serde_json::to_value(service.search(&query, limit).await?)?
        }
    };
    Ok(value)
}

/// 缓存不跨进程保留，依赖列表的查询需先在本进程内加载列表
async fn warm(service: &GalleryService, letter: Option<&str>) -> Result<(), GalleryError> {
    service.latest().await?;
    if let Some(letter) = letter {
        service.browse_by_letter(letter).await?;
    }
    Ok(())
}
