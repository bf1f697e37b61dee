use std::path::PathBuf;

use clap::Parser;

use crate::export::{json::DEFAULT_JSON_EXPORT, xlsx::DEFAULT_XLSX_EXPORT};

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Resolve IP addresses into RIR info and FQDN"
)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File with one IP address or subnet per line; the newest .txt file is used when no value is given
    #[arg(
        short = 'l',
        long = "list",
        value_name = "FILE",
        num_args = 0..=1
    )]
    pub list: Option<Option<PathBuf>>,

    /// Cache file
    #[arg(short = 'c', long = "cache", value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Spreadsheet to annotate in place; the newest .xlsx file is used when no value is given
    #[arg(
        short = 'x',
        long = "excel",
        value_name = "FILE",
        num_args = 0..=1
    )]
    pub excel: Option<Option<PathBuf>>,

    /// Export list results to a spreadsheet
    #[arg(
        long = "excel-export",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_XLSX_EXPORT
    )]
    pub excel_export: Option<PathBuf>,

    /// Export list results to JSON
    #[arg(
        long = "json-export",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_JSON_EXPORT
    )]
    pub json_export: Option<PathBuf>,

    /// Addresses or subnets to resolve along with the list file
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn optional_values_fall_back_to_defaults() {
        let args = Args::try_parse_from(["rirmap", "--json-export", "--excel-export", "--list"])
            .unwrap();
        assert_eq!(args.json_export, Some(PathBuf::from("out.json")));
        assert_eq!(args.excel_export, Some(PathBuf::from("out.xlsx")));
        assert_eq!(args.list, Some(None));
        assert_eq!(args.excel, None);
    }

    #[rstest]
    #[case(&["rirmap", "--list"], Some(None), None)]
    #[case(&["rirmap", "-l"], Some(None), None)]
    #[case(&["rirmap", "-x"], None, Some(None))]
    #[case(&["rirmap", "--excel", "-l"], Some(None), Some(None))]
    #[case(
        &["rirmap", "-l", "ips.txt", "-x", "ssl.xlsx"],
        Some(Some(PathBuf::from("ips.txt"))),
        Some(Some(PathBuf::from("ssl.xlsx")))
    )]
    #[case(&["rirmap"], None, None)]
    fn list_and_excel_accept_a_bare_flag(
        #[case] argv: &[&str],
        #[case] list: Option<Option<PathBuf>>,
        #[case] excel: Option<Option<PathBuf>>,
    ) {
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.list, list);
        assert_eq!(args.excel, excel);
    }

    #[test]
    fn explicit_values_and_addresses() {
        let args = Args::try_parse_from([
            "rirmap",
            "-c",
            "my_cache.json",
            "--json-export",
            "result.json",
            "--",
            "203.0.113.5",
            "198.51.100.0/24",
        ])
        .unwrap();
        assert_eq!(args.cache, Some(PathBuf::from("my_cache.json")));
        assert_eq!(args.json_export, Some(PathBuf::from("result.json")));
        assert_eq!(args.addresses, vec!["203.0.113.5", "198.51.100.0/24"]);
    }
}
