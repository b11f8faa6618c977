// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
                 __ _
 ___ _   _ _ __ / _(_)_ __ ___      _ __ _   _ _ __  _ __   ___ _ __
/ __| | | | '__| |_| | '__/ _ \____| '__| | | | '_ \| '_ \ / _ \ '__|
\__ \ |_| | |  |  _| | | |  __/____| |  | |_| | | | | | | |  __/ |
|___/\__,_|_|  |_| |_|_|  \___|    |_|   \__,_|_| |_|_| |_|\___|_|

    Maven Test Runner Service
"#;
    println!("{}", banner);
}
