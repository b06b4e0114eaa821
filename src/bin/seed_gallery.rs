// src/bin/seed_gallery.rs
// Uploads a folder of photos to a running tournament API.
// Sub-folders named after a gallery category set the category of their photos;
// everything else is uploaded as "tournament".
use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// --- ANSI colours ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const CATEGORIES: [&str; 5] = ["tournament", "practice", "venue", "awards", "team"];
const DEFAULT_CATEGORY: &str = "tournament";
const EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    photo: UploadedPhoto,
}

#[derive(Deserialize)]
struct UploadedPhoto {
    id: i64,
    url: String,
}

#[derive(Debug)]
struct SeedFile {
    path: PathBuf,
    category: String,
}

struct SeedResult {
    file: String,
    category: String,
    outcome: Result<i64, String>,
    duration_secs: f64,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Images in `dir` and its sub-folders; a folder named after a category sets it
fn collect_files(dir: &Path) -> Result<Vec<SeedFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_lowercase();
            let category = if CATEGORIES.contains(&name.as_str()) {
                name
            } else {
                println!(
                    "{}⚠️  Folder {} is not a category, using tournament{}",
                    YELLOW,
                    path.display(),
                    RESET
                );
                DEFAULT_CATEGORY.to_string()
            };
            for inner in std::fs::read_dir(&path)? {
                let inner = inner?.path();
                if inner.is_file() && is_image(&inner) {
                    files.push(SeedFile {
                        path: inner,
                        category: category.clone(),
                    });
                }
            }
        } else if is_image(&path) {
            files.push(SeedFile {
                path,
                category: DEFAULT_CATEGORY.to_string(),
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Title from a file name: "team_photo-2025.jpg" becomes "Team Photo 2025"
fn title_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct GallerySeeder {
    base_url: String,
    client: Client,
    token: Option<String>,
    results: Vec<SeedResult>,
}

impl GallerySeeder {
    fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("creating HTTP client")?;

        Ok(Self {
            base_url,
            client,
            token: None,
            results: Vec::new(),
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn login(&mut self, password: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/api/admin/login", self.base_url))
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("login failed: HTTP {}", response.status());
        }
        self.token = Some(response.json::<LoginResponse>().await?.token);
        Ok(())
    }

    async fn upload(&self, file: &SeedFile) -> Result<UploadedPhoto> {
        let token = self.token.as_deref().context("not logged in")?;
        let file_name = file
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .context("file name is not UTF-8")?
            .to_string();
        let bytes = tokio::fs::read(&file.path).await?;

        let form = multipart::Form::new()
            .text("title", title_for(&file.path))
            .text("category", file.category.clone())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/api/gallery/photos/upload", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            bail!("HTTP {} - {}", status, body);
        }
        Ok(response.json::<UploadResponse>().await?.photo)
    }

    async fn run(&mut self, files: Vec<SeedFile>) {
        let total = files.len();
        println!("\n{}🚀 Uploading {} photos...{}\n", BOLD, total, RESET);

        for (i, file) in files.iter().enumerate() {
            let start_time = Instant::now();
            let name = file.path.display().to_string();
            println!("{}[{}/{}] {} ({}){}", CYAN, i + 1, total, name, file.category, RESET);

            let outcome = match self.upload(file).await {
                Ok(photo) => {
                    println!("{}✅ Uploaded as #{} at {}{}", GREEN, photo.id, photo.url, RESET);
                    Ok(photo.id)
                }
                Err(e) => {
                    println!("{}❌ {}{}", RED, e, RESET);
                    Err(e.to_string())
                }
            };

            self.results.push(SeedResult {
                file: name,
                category: file.category.clone(),
                outcome,
                duration_secs: start_time.elapsed().as_secs_f64(),
            });
        }

        self.print_summary();
    }

    fn print_summary(&self) {
        println!("\n{}📋 Upload Summary{}", BOLD, RESET);
        println!("──────────────────────────────────────────────────────────────────────");
        println!("{:<40} {:<12} {:>8} {:>8}", "File", "Category", "Id", "Time");
        println!("──────────────────────────────────────────────────────────────────────");

        let mut uploaded = 0;
        for res in &self.results {
            let id = match &res.outcome {
                Ok(id) => {
                    uploaded += 1;
                    id.to_string()
                }
                Err(_) => "❌".to_string(),
            };
            println!(
                "{:<40} {:<12} {:>8} {:>7.1}s",
                res.file, res.category, id, res.duration_secs
            );
        }

        println!("──────────────────────────────────────────────────────────────────────");
        println!(
            "{}✨ {} of {} photos uploaded{}",
            if uploaded == self.results.len() { GREEN } else { YELLOW },
            uploaded,
            self.results.len(),
            RESET
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let dir = env::args()
        .nth(1)
        .or_else(|| env::var("SEED_PHOTOS_DIR").ok())
        .context("usage: seed_gallery <photo-dir> (or set SEED_PHOTOS_DIR)")?;
    let password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set in .env")?;
    let base_url = env::var("TOURNAMENT_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());

    let files = collect_files(Path::new(&dir))?;
    if files.is_empty() {
        println!("{}No images found in {}{}", YELLOW, dir, RESET);
        return Ok(());
    }

    let mut seeder = GallerySeeder::new(base_url)?;

    println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
    if !seeder.check_service_health().await {
        bail!("service unavailable at {}", seeder.base_url);
    }
    println!("{}✅ Service available{}", GREEN, RESET);

    seeder.login(&password).await?;
    seeder.run(files).await;
    Ok(())
}
