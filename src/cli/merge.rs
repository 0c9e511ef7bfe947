// merge.rs - merge configuration file with CLI arguments; CLI values take precedence

use crate::cli::{Args, Config};

impl Args {
    pub fn merge_with_config(mut self, config: Config) -> Self {
        if self.formatter.is_none() {
            self.formatter = config.formatter;
        }
        if self.formatter_name.is_none() {
            self.formatter_name = config.formatter_name;
        }
        if self.mode == "normal" {
            if let Some(mode) = config.mode {
                self.mode = mode;
            }
        }
        if self.ignore.is_empty() {
            if let Some(ignore) = config.ignore {
                self.ignore = ignore;
            }
        }
        if self.max_rounds == 64 {
            if let Some(max_rounds) = config.max_rounds {
                self.max_rounds = max_rounds;
            }
        }
        if self.concurrency == "threads" {
            if let Some(concurrency) = config.concurrency {
                self.concurrency = concurrency;
            }
        }
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.cache_mode == "dedup" {
            if let Some(cache_mode) = config.cache_mode {
                self.cache_mode = cache_mode;
            }
        }
        if self.cache_path.is_none() {
            self.cache_path = config.cache_path;
        }
        if self.start_style.is_none() {
            self.start_style = config.start_style;
        }
        if self.output_style.is_none() {
            self.output_style = config.output_style;
        }
        if self.save_metric.is_none() {
            self.save_metric = config.save_metric;
        }
        if self.bestofround == 0 {
            if let Some(bestofround) = config.bestofround {
                self.bestofround = bestofround;
            }
        }
        if self.difftool == "auto" {
            if let Some(difftool) = config.difftool {
                self.difftool = difftool;
            }
        }
        if !self.concat {
            self.concat = config.concat.unwrap_or(false);
        }
        if !self.keep_temp_files {
            self.keep_temp_files = config.keep_temp_files.unwrap_or(false);
        }
        self
    }

    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
