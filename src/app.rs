use crate::{
    cli::{Settings, input::read_address_list},
    error::RirmapError,
    export::{XlsxWorkbook, write_json, write_xlsx},
    lookup::{AddressResolver, BatchDriver},
    net::{NetworkCache, RdapClient, RegistryClient, ReverseResolver, SystemReverseResolver},
};

/// Run with the RDAP registry client and the system DNS resolver
pub async fn run(settings: &Settings) -> Result<(), RirmapError> {
    let registry = RdapClient::new(&settings.rdap_url, settings.registry_timeout)?;
    let reverse = SystemReverseResolver::new()?;
    run_with(settings, registry, reverse).await
}

/// Resolve the list and spreadsheet inputs named by `settings`
pub async fn run_with<R: RegistryClient, D: ReverseResolver>(
    settings: &Settings,
    registry: R,
    reverse: D,
) -> Result<(), RirmapError> {
    let mut tokens = settings.addresses.clone();
    if let Some(list) = settings.list.as_ref() {
        log::info!("Reading addresses from {}", list.display());
        tokens.extend(read_address_list(list)?);
    }

    if tokens.is_empty() && settings.excel.is_none() {
        log::warn!("Nothing to resolve: pass addresses, --list or --excel");
        return Ok(());
    }

    let mut cache = NetworkCache::load(&settings.paths.cache, settings.ttl)?;
    log::info!("Loaded {} cached networks", cache.len());

    let driver = BatchDriver::new(
        AddressResolver::new(registry, reverse, settings.retry.clone()),
        settings.pacing.clone(),
        settings.paths.clone(),
    );

    if !tokens.is_empty() {
        let report = driver.run_list(&mut cache, &tokens).await?;
        for record in &report.records {
            println!("{record}");
        }
        if let Some(path) = settings.json_export.as_ref() {
            write_json(path, &report.records)?;
        }
        if let Some(path) = settings.excel_export.as_ref() {
            write_xlsx(path, &report.records)?;
        }
    }

    if let Some(path) = settings.excel.as_ref() {
        let mut workbook = XlsxWorkbook::open(path)?;
        driver
            .run_workbook(&mut cache, &mut workbook, &settings.sheets)
            .await?;
        workbook.save()?;
    }

    Ok(())
}
