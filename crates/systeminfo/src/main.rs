fn main() {
    let root = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let sysinfo = systeminfo::SystemInfo::new(root);
    let json = serde_json::to_string_pretty(&sysinfo).unwrap();

    println!("{json}");
}
