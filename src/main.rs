use anyhow::{bail, Context};
use clap::Parser;
use element_compat::{admin, cli, config, export, grid, importer, logging, matcher, store};
use cli::{Cli, Commands, RecordsAction, TypesAction};
use config::Config;
use element_compat_common::{find_compatibility, RecordEdit, RecordStore};
use grid::{GridSource, MemoryGridSource, XlsxGridSource};
use importer::{ImportManifest, ImportOptions};
use std::path::PathBuf;
use store::JsonRecordStore;

fn open_store(cli_store: Option<PathBuf>, config: &Config) -> anyhow::Result<JsonRecordStore> {
    let path = match cli_store {
        Some(path) => path,
        None => config.resolved_store_path()?,
    };
    let store = JsonRecordStore::open(&path)
        .with_context(|| format!("ストアを開けません: {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = store.len(), "ストア読み込み");
    Ok(store)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Import { manifest, workbook, grid_json, range, compatibility_type, sheet, name, dry_run, json } => {
            if !json {
                println!("📥 element-compat - 相性表取り込み\n");
            }

            // 1. 取り込み定義
            let mut manifest = match (manifest, range, compatibility_type) {
                (Some(path), _, _) => ImportManifest::load(&path)
                    .with_context(|| format!("取り込み定義を読めません: {}", path.display()))?,
                (None, Some(range), Some(t)) => {
                    let mut single = ImportManifest::single(t, range);
                    single.schemes[0].name = name;
                    single
                }
                _ => bail!("--manifest または --range と --type を指定してください"),
            };
            if sheet.is_some() {
                manifest.default_sheet = sheet;
            }
            if manifest.default_sheet.is_none() {
                manifest.default_sheet = config.default_sheet.clone();
            }

            // 2. 取得元
            let source: Box<dyn GridSource + Sync> = match grid_json {
                Some(path) => Box::new(MemoryGridSource::from_json_file(&path)?),
                None => {
                    let path = workbook
                        .or_else(|| manifest.workbook.clone())
                        .or_else(|| config.resolved_workbook())
                        .context("ワークブックが指定されていません（--workbook または設定）")?;
                    if !json {
                        println!("[1/2] ワークブックを読み込み中... {}", path.display());
                    }
                    Box::new(XlsxGridSource::open(&path)?)
                }
            };

            // 3. 取り込み
            if !json {
                println!("[2/2] 範囲をデコード中...{}", if dry_run { " (ドライラン)" } else { "" });
            }
            let mut store = open_store(cli.store, &config)?;
            let options = ImportOptions { dry_run, show_progress: !json };
            let report = importer::run_import(source.as_ref(), &mut store, &manifest, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for scheme in &report.schemes {
                    let status = if scheme.replaced {
                        "置き換え"
                    } else if scheme.failures.is_empty() {
                        "未書き込み"
                    } else {
                        "失敗（既存を保持）"
                    };
                    println!(
                        "  type {}: {}範囲 {}件 {}",
                        scheme.compatibility_type, scheme.ranges, scheme.records, status
                    );
                    for failure in &scheme.failures {
                        println!("    ✗ {}: {}", failure.range, failure.message);
                    }
                }
            }

            if report.has_failures() {
                bail!("{}範囲の取り込みに失敗しました", report.failed_ranges().len());
            }
            if !json {
                println!("\n✅ 取り込み完了: {}件", report.total_records());
            }
        }

        Commands::Match { query, a_valuable, a_problem, b_valuable, b_problem, json } => {
            let query = match query {
                Some(path) => matcher::load_query(&path)?,
                None => matcher::query_from_args(
                    a_valuable.as_deref(),
                    a_problem.as_deref(),
                    b_valuable.as_deref(),
                    b_problem.as_deref(),
                ),
            };

            let store = open_store(cli.store, &config)?;
            let response = find_compatibility(&store, &query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", matcher::format_response(&response));
            }
        }

        Commands::Patterns { codes } => {
            for code in codes {
                println!("{} → {}", code, matcher::describe_patterns(&code));
            }
        }

        Commands::Records { action } => {
            let mut store = open_store(cli.store, &config)?;

            match action {
                RecordsAction::List { compatibility_type } => {
                    let records = admin::list_records(&store, compatibility_type)?;
                    for record in &records {
                        println!("{}", admin::format_record(record));
                    }
                    println!("\n{}件", records.len());
                }

                RecordsAction::Edit { id, a_peach, a_hard, b_peach, b_hard } => {
                    let edit = RecordEdit {
                        a_peach: admin::slot_edit_from_arg(a_peach.as_deref()),
                        a_hard: admin::slot_edit_from_arg(a_hard.as_deref()),
                        b_peach: admin::slot_edit_from_arg(b_peach.as_deref()),
                        b_hard: admin::slot_edit_from_arg(b_hard.as_deref()),
                    };

                    let edit = if edit.is_noop() {
                        let current = store.get_record(id)?;
                        admin::prompt_record_edit(&current)?
                    } else {
                        edit
                    };

                    let updated = admin::edit_record(&mut store, id, &edit)?;
                    println!("✔ 修正しました");
                    println!("{}", admin::format_record(&updated));
                }

                RecordsAction::Delete { id } => {
                    let removed = admin::delete_record(&mut store, id)?;
                    println!("✔ 削除しました");
                    println!("{}", admin::format_record(&removed));
                }
            }
        }

        Commands::Types { action } => {
            let mut store = open_store(cli.store, &config)?;

            match action {
                TypesAction::List => {
                    let types = store.compatibility_types()?;
                    if types.is_empty() {
                        println!("スキームが登録されていません");
                    }
                    for t in types {
                        let count = store.records_for(t.id)?.len();
                        println!("type {:<3} {} ({}件) {}", t.id, t.name, count, t.description);
                    }
                }

                TypesAction::Set { id, name, description } => {
                    let saved = admin::set_type(&mut store, id, &name, description.as_deref())?;
                    println!("✔ type {} を登録しました: {}", saved.id, saved.name);
                }

                TypesAction::Remove { id } => {
                    let removed = admin::remove_type(&mut store, id)?;
                    println!("✔ type {} ({}) を削除しました", removed.id, removed.name);
                }
            }
        }

        Commands::Export { output, compatibility_type } => {
            println!("📄 element-compat - エクスポート\n");
            let store = open_store(cli.store, &config)?;

            println!("- Excelを生成中...");
            let (path, count) = export::export_records(&store, &output, compatibility_type)?;
            println!("✔ Excel出力: {} ({}件)", path.display(), count);
        }

        Commands::Config { set_store, set_workbook, set_sheet, show } => {
            let mut config = config;

            if let Some(path) = set_store {
                config.set_store_path(path)?;
                println!("✔ ストアのパスを設定しました");
            }

            if let Some(path) = set_workbook {
                config.set_workbook(path)?;
                println!("✔ ワークブックを設定しました");
            }

            if let Some(sheet) = set_sheet {
                config.set_default_sheet(sheet)?;
                println!("✔ 既定のシートを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ストア: {}", config.resolved_store_path()?.display());
                println!(
                    "  ワークブック: {}",
                    config
                        .resolved_workbook()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                );
                println!("  既定のシート: {}", config.default_sheet.as_deref().unwrap_or("未設定"));
            }
        }
    }

    Ok(())
}
