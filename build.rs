//! Build script to embed Windows resource metadata into executables
//! This sets the application name shown in Task Manager

fn main() {
    #[cfg(windows)]
    {
        // Get the binary name being built
        let target = std::env::var("CARGO_BIN_NAME").unwrap_or_default();

        let mut res = winresource::WindowsResource::new();

        res.set("ProductName", "Alone");
        res.set("ProductVersion", env!("CARGO_PKG_VERSION"));
        res.set("FileVersion", env!("CARGO_PKG_VERSION"));

        match target.as_str() {
            "alone_check" => {
                res.set("FileDescription", "Alone single-instance check");
                res.set("InternalName", "alone_check");
                res.set("OriginalFilename", "alone_check.exe");
            }
            _ => {
                res.set("FileDescription", "Alone");
                res.set("InternalName", "Alone");
            }
        }

        if let Err(e) = res.compile() {
            eprintln!("Warning: Failed to compile Windows resources: {}", e);
        }
    }
}
