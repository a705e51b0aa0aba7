use std::path::PathBuf;

use anyhow::Context;
use libfdfile::{FileHandle, HandleOptions, Suppress};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().unwrap_or_else(|| "file.txt".to_string()));
    let opts = match args.next() {
        Some(config) => {
            let data = std::fs::read_to_string(&config)
                .with_context(|| format!("Failed to read {config}"))?;
            serde_json::from_str::<HandleOptions>(&data)
                .with_context(|| format!("Failed to parse {config}"))?
        }
        None => HandleOptions::default(),
    };

    let mut fw = opts.open(&path)?;
    info!("{} opened for write", path.display());
    println!("{:?}", fw.read(None).suppress()?);
    println!("{:?}", fw.write("Hello World").suppress()?);
    println!("{:?}", fw.write("!!!").suppress()?);
    println!("{:?}", fw.write_line("New line text added").suppress()?);
    fw.close().suppress()?;
    info!("{} closed", path.display());

    let mut fr = opts.open(&path)?;
    info!("{} opened for read", path.display());
    println!("{:?}", fr.read(None).suppress()?);
    println!("{:?}", fr.read_line().suppress()?);
    fr.close().suppress()?;
    info!("{} closed", path.display());

    let mut scoped = opts.open(&path)?;
    scoped.scoped(|f| {
        println!("{:?}", f.read(Some(1)).suppress()?);
        println!("{:?}", f.read(None).suppress()?);
        for _ in 0..3 {
            println!("{:?}", f.read_line().suppress()?);
        }
        Ok(())
    });
    // the scope released the descriptor, so this is suppressed
    println!("{:?}", scoped.read(None).suppress()?);

    // never closed: released by Drop, which logs a warning
    let abandoned = FileHandle::open(&path, "r")?;
    drop(abandoned);
    Ok(())
}
