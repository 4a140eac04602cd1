use std::path::PathBuf;

/// Materializes a configuration file in a scratch directory, removed on drop.
pub struct TestConfig {
    pub dir: PathBuf,
    pub path: PathBuf,
}

impl TestConfig {
    pub fn create(test_name: &str, contents: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("reboot_stack_test_{test_name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, contents).unwrap();
        Self { dir, path }
    }
}

impl Drop for TestConfig {
    fn drop(&mut self) {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }
}
