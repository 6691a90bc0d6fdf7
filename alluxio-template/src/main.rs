use std::path::PathBuf;
use std::time::Duration;

use alluxio_template::client::{
    MountOptions, ReadType, SetAttributeOptions, UriStatus, WriteType,
};
use alluxio_template::consts::NON_SPECIFIED_WORKER;
use alluxio_template::util::ConsoleOutput;
use alluxio_template::{
    AlluxioTemplate, ClientConfig, LocalFileSystem, logging, write_large_file_local,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncWriteExt;

type Template = AlluxioTemplate<LocalFileSystem>;

#[derive(Parser)]
#[command(name = "alluxio-template", version)]
#[command(about = "Path-oriented client for an Alluxio-style file system", long_about = None)]
struct Cli {
    /// Master location, e.g. alluxio://localhost:19998
    #[arg(long, env = "ALLUXIO_MASTER")]
    master: Option<String>,

    /// Backing directory of the local client
    #[arg(long, env = "ALLUXIO_LOCAL_ROOT")]
    root: Option<PathBuf>,

    /// Do not print results
    #[arg(short, long)]
    quiet: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a directory")]
    Mkdir {
        path: String,
        #[arg(short, long)]
        parents: bool,
    },
    #[command(about = "Create an empty file")]
    Touch {
        path: String,
        #[arg(short, long)]
        parents: bool,
        /// Block size in MiB, implies --parents
        #[arg(long)]
        block_size_mb: Option<u64>,
    },
    #[command(about = "Delete a file or directory")]
    Rm {
        path: String,
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    #[command(about = "List a directory")]
    Ls { path: String },
    #[command(about = "Show the status of a path")]
    Stat { path: String },
    #[command(about = "Check whether a path exists")]
    Exists { path: String },
    #[command(about = "Rename a path")]
    Mv { src: String, dst: String },
    #[command(about = "Free cached data of a path")]
    Free {
        path: String,
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    #[command(about = "Load metadata of a path from the under storage")]
    LoadMetadata {
        path: String,
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    #[command(about = "Mount an under storage directory")]
    Mount {
        alluxio_path: String,
        ufs_path: String,
        #[arg(long)]
        read_only: bool,
    },
    #[command(about = "Unmount a mount point")]
    Unmount { path: String },
    #[command(about = "Change attributes of a path")]
    Chattr {
        path: String,
        #[arg(long)]
        pinned: Option<bool>,
        #[arg(long)]
        persisted: Option<bool>,
        #[arg(long)]
        ttl_ms: Option<u64>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        group: Option<String>,
        /// Octal permission bits, e.g. 755
        #[arg(long, value_parser = parse_mode)]
        mode: Option<u32>,
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    #[command(about = "Write a message into a new file")]
    Write {
        path: String,
        msg: String,
        /// Repeat the message until the file reaches this many MiB
        #[arg(long)]
        size_mb: Option<f64>,
        #[arg(long, default_value = "MUST_CACHE")]
        write_type: WriteType,
        /// LocalFirst, MostAvailableFirst or a worker hostname
        #[arg(long, default_value = NON_SPECIFIED_WORKER)]
        worker: String,
    },
    #[command(about = "Write a padded file on local disk as a baseline")]
    WriteLocal {
        file: PathBuf,
        msg: String,
        #[arg(long)]
        size_mb: f64,
    },
    #[command(about = "Read a file to the end and report its size")]
    Read {
        path: String,
        #[arg(long, default_value = "CACHE_PROMOTE")]
        read_type: ReadType,
        #[arg(long, default_value = NON_SPECIFIED_WORKER)]
        worker: String,
        /// Log every chunk read
        #[arg(long)]
        print: bool,
    },
}

fn parse_mode(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s, 8).map_err(|e| format!("invalid octal mode `{s}`: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "warn" });
    let console = ConsoleOutput::new(!cli.quiet);

    let mut config = ClientConfig::from_env()?;
    if let Some(root) = cli.root {
        config.local_root = root;
    }
    let template = match cli.master.as_deref() {
        Some(master) => Template::with_master_config(master, config).await,
        None => Template::connect_with(config).await,
    }
    .context("failed to connect")?;

    run(&template, cli.command, &console).await
}

async fn run(template: &Template, command: Commands, console: &ConsoleOutput) -> anyhow::Result<()> {
    match command {
        Commands::Mkdir { path, parents } => {
            if parents {
                template.create_dir_recursive(&path).await?;
            } else {
                template.create_directory(&path).await?;
            }
            console.log(&format!("created directory {path}"));
        }
        Commands::Touch {
            path,
            parents,
            block_size_mb,
        } => {
            let mut out = match block_size_mb {
                Some(mb) => template.create_file_recursive_with_size(&path, mb).await?,
                None if parents => template.create_file_recursive(&path).await?,
                None => template.create_file(&path).await?,
            };
            out.shutdown().await?;
            console.log(&format!("created file {path}"));
        }
        Commands::Rm { path, recursive } => {
            if recursive {
                template.delete_recursive(&path).await?;
            } else {
                template.delete(&path).await?;
            }
            console.log(&format!("deleted {path}"));
        }
        Commands::Ls { path } => {
            for st in template.list_status(&path).await? {
                console.log(&format_status(&st));
            }
        }
        Commands::Stat { path } => {
            let st = template.get_status(&path).await?;
            console.log(&format!("{st:#?}"));
        }
        Commands::Exists { path } => {
            let found = template.exists(&path).await?;
            console.log(&format!("{path} {}", if found { "exists" } else { "does not exist" }));
        }
        Commands::Mv { src, dst } => {
            template.rename(&src, &dst).await?;
            console.log(&format!("renamed {src} to {dst}"));
        }
        Commands::Free { path, recursive } => {
            if recursive {
                template.free_recursive(&path).await?;
            } else {
                template.free(&path).await?;
            }
            console.log(&format!("freed {path}"));
        }
        Commands::LoadMetadata { path, recursive } => {
            if recursive {
                template.load_metadata_recursive(&path).await?;
            } else {
                template.load_metadata(&path).await?;
            }
            console.log(&format!("loaded metadata of {path}"));
        }
        Commands::Mount {
            alluxio_path,
            ufs_path,
            read_only,
        } => {
            let options = MountOptions {
                read_only,
                ..Default::default()
            };
            template.mount_with(&alluxio_path, &ufs_path, options).await?;
            console.log(&format!("mounted {ufs_path} at {alluxio_path}"));
        }
        Commands::Unmount { path } => {
            template.unmount(&path).await?;
            console.log(&format!("unmounted {path}"));
        }
        Commands::Chattr {
            path,
            pinned,
            persisted,
            ttl_ms,
            owner,
            group,
            mode,
            recursive,
        } => {
            let options = SetAttributeOptions {
                pinned,
                persisted,
                ttl: ttl_ms.map(Duration::from_millis),
                owner,
                group,
                mode,
                recursive,
            };
            template.set_attribute_with(&path, options).await?;
            console.log(&format!("updated attributes of {path}"));
        }
        Commands::Write {
            path,
            msg,
            size_mb,
            write_type,
            worker,
        } => match size_mb {
            Some(size) => {
                let written = template
                    .write_large_file(&path, &msg, size, write_type, &worker)
                    .await?;
                console.log(&format!("wrote {written} bytes to {path}"));
            }
            None => {
                template.write_file(&path, &msg, write_type, &worker).await?;
                console.log(&format!("wrote {} bytes to {path}", msg.len()));
            }
        },
        Commands::WriteLocal { file, msg, size_mb } => {
            let written = write_large_file_local(&file, &msg, size_mb).await?;
            console.log(&format!("wrote {written} bytes to {}", file.display()));
        }
        Commands::Read {
            path,
            read_type,
            worker,
            print,
        } => {
            let n = template.read_file_at(&path, read_type, print, &worker).await?;
            console.log(&format!("read {n} bytes from {path}"));
        }
    }
    Ok(())
}

fn format_status(st: &UriStatus) -> String {
    format!(
        "{}{:o}\t{:>12}\t{:>3}%\t{}{}",
        if st.folder { "d" } else { "-" },
        st.mode,
        st.length,
        st.in_memory_percentage,
        st.path,
        if st.mount_point { "\t(mount point)" } else { "" },
    )
}
