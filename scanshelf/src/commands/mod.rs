use anyhow::{bail, Context, Result};
use console::style;
use dialoguer::Input;
use scanshelf_core::scan::ScanResult;
use scanshelf_core::storage::{is_valid_file_name, Folder};
use tracing::{info, warn};

use crate::cli::{ImportArgs, PdfArgs, RenameArgs, RenamePageArgs, ShowArgs};
use crate::AppContext;

// --- Handler Functions ---

pub async fn handle_import(args: ImportArgs, cx: &AppContext) -> Result<()> {
    let name = match (args.name, args.yes) {
        (Some(name), _) => Some(name),
        (None, true) => None,
        (None, false) if console::user_attended() => prompt_folder_name()?,
        (None, false) => None,
    };

    let scan = ScanResult { pages: args.pages, pdf: args.pdf };
    let imported = cx.store.import_scan(scan, name.as_deref()).await?;
    let folder = &imported.folder;

    println!(
        "Saved {} with {} pages ({})",
        style(folder.name()).bold(),
        folder.page_count(),
        folder.id()
    );

    match imported.pdf {
        Some(Ok(pdf)) => println!("  PDF: {}", pdf.path().display()),
        Some(Err(e)) => {
            warn!("PDF for folder {} was not saved: {}", folder.id(), e);
            return Err(e).context(format!(
                "Folder {} was stored, but its PDF could not be saved",
                folder.id()
            ));
        }
        None => {}
    }
    Ok(())
}

/// Asks for a folder name; an empty answer keeps the generated one.
fn prompt_folder_name() -> Result<Option<String>> {
    let name = Input::<String>::new()
        .with_prompt("Folder name (empty for default)")
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            let input = input.trim();
            if input.is_empty() || is_valid_file_name(input) {
                Ok(())
            } else {
                Err("A folder name cannot contain path separators")
            }
        })
        .interact_text()?;
    let name = name.trim();
    Ok((!name.is_empty()).then(|| name.to_string()))
}

pub async fn handle_list(cx: &AppContext) -> Result<()> {
    let folders = cx.store.load_all().await;
    if folders.is_empty() {
        println!("No document folders yet. Import a scan to get started.");
        return Ok(());
    }

    for folder in &folders {
        println!(
            "{}  {}  {}  {}",
            style(folder.name()).bold(),
            style(folder.created_at()).dim(),
            pages_label(folder.page_count()),
            style(folder.id()).dim()
        );
    }
    Ok(())
}

pub async fn handle_show(args: ShowArgs, cx: &AppContext) -> Result<()> {
    let folder = find_folder(cx, &args.folder_id).await?;

    println!("  Name:    {}", style(folder.name()).bold());
    println!("  ID:      {}", folder.id());
    println!("  Created: {}", folder.created_at());
    println!("  Pages:   {}", folder.page_count());

    if folder.is_empty() {
        println!();
        println!("  No documents found");
    }
    for (idx, page) in folder.pages().iter().enumerate() {
        println!();
        println!("  {:3}. {}  {}", idx + 1, page.name(), style(page.created_at()).dim());
        println!("       {}", page.image_ref());
    }

    println!();
    match cx.store.pdf_for(&folder).await {
        Some(pdf) => println!("  PDF: {}", pdf.path().display()),
        None => println!("  PDF: {}", style("none").dim()),
    }
    Ok(())
}

pub async fn handle_rename(args: RenameArgs, cx: &AppContext) -> Result<()> {
    match cx.store.rename_folder(&args.folder_id, &args.name).await? {
        Some(folder) => {
            info!("Folder {} renamed", folder.id());
            println!("Renamed folder to {}", style(folder.name()).bold());
            Ok(())
        }
        None => bail!("Folder not found: {}", args.folder_id),
    }
}

pub async fn handle_rename_page(args: RenamePageArgs, cx: &AppContext) -> Result<()> {
    // Page numbers on the command line start at 1
    let index = (args.page as usize).saturating_sub(1);
    match cx.store.rename_page(&args.folder_id, index, &args.name).await? {
        Some(folder) => {
            println!(
                "Renamed page {} of {} to {}",
                args.page,
                folder.name(),
                style(folder.pages()[index].name()).bold()
            );
            Ok(())
        }
        None => bail!("No page {} in folder {}", args.page, args.folder_id),
    }
}

pub async fn handle_pdf(args: PdfArgs, cx: &AppContext) -> Result<()> {
    let folder = find_folder(cx, &args.folder_id).await?;
    let Some(pdf) = cx.store.pdf_for(&folder).await else {
        bail!("No PDF stored for folder {}", folder.name());
    };

    if args.uri {
        println!("{}", pdf.uri()?);
    } else {
        println!("{}", pdf.path().display());
    }
    Ok(())
}

async fn find_folder(cx: &AppContext, id: &str) -> Result<Folder> {
    match cx.store.find_by_id(id).await {
        Some(folder) => Ok(folder),
        None => bail!("Folder not found: {}", id),
    }
}

fn pages_label(count: usize) -> String {
    match count {
        1 => "1 page".to_string(),
        n => format!("{} pages", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanshelf_core::config::StoreConfig;
    use scanshelf_core::storage::Page;
    use tempfile::tempdir;

    fn context(dir: &std::path::Path) -> AppContext {
        AppContext::new(StoreConfig::new(dir))
    }

    #[tokio::test]
    async fn test_import_with_name() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        let args = ImportArgs {
            pages: vec!["content://scan/1".to_string()],
            pdf: None,
            name: Some("Lease".to_string()),
            yes: false,
        };

        handle_import(args, &cx).await.unwrap();

        let folders = cx.store.load_all().await;
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].name(), "Lease");
    }

    #[tokio::test]
    async fn test_import_reports_missing_pdf_but_keeps_folder() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        let args = ImportArgs {
            pages: vec!["content://scan/1".to_string()],
            pdf: Some(dir.path().join("missing.pdf")),
            name: None,
            yes: true,
        };

        assert!(handle_import(args, &cx).await.is_err());
        assert_eq!(cx.store.load_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_path_like_name() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        let args = ImportArgs {
            pages: vec!["content://scan/1".to_string()],
            pdf: None,
            name: Some("2025/Q1".to_string()),
            yes: false,
        };

        assert!(handle_import(args, &cx).await.is_err());
        assert!(cx.store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_rename_commands() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        let mut folder = Folder::new();
        folder.add_page(Page::new("content://scan/1"));
        cx.store.upsert(&folder).await.unwrap();
        let id = folder.id().to_string();

        handle_rename(RenameArgs { folder_id: id.clone(), name: "Bills".into() }, &cx)
            .await
            .unwrap();
        handle_rename_page(RenamePageArgs { folder_id: id.clone(), page: 1, name: "Front".into() }, &cx)
            .await
            .unwrap();

        let stored = cx.store.find_by_id(&id).await.unwrap();
        assert_eq!(stored.name(), "Bills");
        assert_eq!(stored.pages()[0].name(), "Front");

        let missing_page = RenamePageArgs { folder_id: id, page: 2, name: "x".into() };
        assert!(handle_rename_page(missing_page, &cx).await.is_err());
    }

    #[tokio::test]
    async fn test_show_and_pdf_for_unknown_folder() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        assert!(handle_show(ShowArgs { folder_id: "nope".into() }, &cx).await.is_err());
        assert!(handle_pdf(PdfArgs { folder_id: "nope".into(), uri: false }, &cx).await.is_err());
    }

    #[tokio::test]
    async fn test_pdf_uri_command_encodes_name() {
        let dir = tempdir().unwrap();
        let cx = context(dir.path());
        let source = dir.path().join("scan.pdf");
        tokio::fs::write(&source, b"%PDF").await.unwrap();
        let args = ImportArgs {
            pages: vec!["content://scan/1".to_string()],
            pdf: Some(source),
            name: Some("Q1 #2".to_string()),
            yes: false,
        };
        handle_import(args, &cx).await.unwrap();

        let folder = cx.store.load_all().await.remove(0);
        let pdf = cx.store.pdf_for(&folder).await.unwrap();
        assert!(pdf.uri().unwrap().as_str().ends_with("/Q1%20%232.pdf"));
        handle_pdf(PdfArgs { folder_id: folder.id().to_string(), uri: true }, &cx)
            .await
            .unwrap();
    }

    #[test]
    fn test_pages_label() {
        assert_eq!(pages_label(0), "0 pages");
        assert_eq!(pages_label(1), "1 page");
        assert_eq!(pages_label(12), "12 pages");
    }
}
