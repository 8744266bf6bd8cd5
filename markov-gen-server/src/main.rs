use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use markov_gen_core::batch::generate_book;
use markov_gen_core::io::{normalize_folder, read_corpus};
use markov_gen_core::metadata::{read_metadata, MetadataChains};
use markov_gen_core::model::ChainStats;
use markov_gen_core::{Chain, ChainBuilder, GenerateError, Generator, ModelError, Settings, TokenizePolicy};

/// Command-line options of the server.
#[derive(Parser, Debug)]
#[command(about = "Serves text generated from a word-level Markov chain")]
struct Args {
	/// Folder of `.txt` files used as the initial corpus
	#[arg(long)]
	corpus: Option<String>,

	/// Optional CSV table (filename,title,author) for title/author synthesis
	#[arg(long)]
	metadata: Option<String>,

	/// TOML settings file; flags below override it
	#[arg(long)]
	config: Option<String>,

	#[arg(long)]
	order: Option<usize>,

	#[arg(long)]
	policy: Option<TokenizePolicy>,

	/// Remove Project Gutenberg boilerplate from corpus files
	#[arg(long)]
	strip_gutenberg: bool,

	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,
}

/// Query parameters for `/v1/generate` and `/v1/book`.
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<u64>,
	length: Option<usize>,
}

/// Query parameters for `/v1/load`.
#[derive(Deserialize)]
struct LoadParams {
	folder: Option<String>,
	order: Option<usize>,
	policy: Option<String>,
	strip_gutenberg: Option<bool>,
}

/// Response body of `/v1/chain`.
#[derive(Serialize)]
struct ChainReport {
	#[serde(flatten)]
	stats: ChainStats,
	metadata: bool,
}

/// State shared by all workers.
///
/// The chain is only read while generating; `/v1/load` swaps it under the
/// write lock.
struct SharedData {
	settings: Settings,
	chain: Chain,
	metadata: Option<MetadataChains>,
}

fn generation_error(e: GenerateError) -> HttpResponse {
	match e {
		GenerateError::EmptyModel => HttpResponse::UnprocessableEntity().body(e.to_string()),
		GenerateError::ZeroLength => HttpResponse::BadRequest().body(e.to_string()),
	}
}

/// Resolves the requested length against the server settings.
fn requested_length(settings: &Settings, query: &GenerateParams) -> Result<usize, HttpResponse> {
	settings
		.check_length(query.length.unwrap_or(settings.length))
		.map_err(|e| HttpResponse::BadRequest().body(e.to_string()))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates normalized text from the shared chain. `seed` and `length`
/// default to the server settings; `length` may not exceed `max_length`.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let seed = query.seed.unwrap_or(shared_data.settings.seed);
	let length = match requested_length(&shared_data.settings, &query) {
		Ok(l) => l,
		Err(response) => return response,
	};

	match Generator::new(&shared_data.chain).generate(seed, length) {
		Ok(sequence) => HttpResponse::Ok().body(sequence.to_text()),
		Err(e) => generation_error(e),
	}
}

/// HTTP GET endpoint `/v1/book`
///
/// Same as `/v1/generate`, with the `Title:`/`Author:` header when a
/// metadata table was loaded.
#[get("/v1/book")]
async fn get_book(data: web::Data<RwLock<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let seed = query.seed.unwrap_or(shared_data.settings.seed);
	let length = match requested_length(&shared_data.settings, &query) {
		Ok(l) => l,
		Err(response) => return response,
	};

	match generate_book(&shared_data.chain, shared_data.metadata.as_ref(), seed, length) {
		Ok(book) => HttpResponse::Ok().body(book.render()),
		Err(e) => generation_error(e),
	}
}

#[get("/v1/chain")]
async fn get_chain(data: web::Data<RwLock<SharedData>>) -> impl Responder {
	let shared_data = match data.read() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	HttpResponse::Ok().json(ChainReport {
		stats: shared_data.chain.stats(),
		metadata: shared_data.metadata.is_some(),
	})
}

/// HTTP PUT endpoint `/v1/load`
///
/// Rebuilds the chain from a corpus folder. The corpus is read and the chain
/// built on the blocking thread pool before the write lock is taken, so
/// generation keeps running on the previous chain meanwhile.
#[put("/v1/load")]
async fn put_load(data: web::Data<RwLock<SharedData>>, query: web::Query<LoadParams>) -> impl Responder {
	let folder = match &query.folder {
		Some(s) if !s.trim().is_empty() => normalize_folder(s.trim()),
		_ => return HttpResponse::BadRequest().body("Missing or empty folder"),
	};

	let (default_order, default_policy) = match data.read() {
		Ok(d) => (d.settings.order, d.settings.policy),
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	let order = query.order.unwrap_or(default_order);
	let policy = match query.policy.as_deref().map(str::parse::<TokenizePolicy>) {
		None => default_policy,
		Some(Ok(p)) => p,
		Some(Err(e)) => return HttpResponse::BadRequest().body(e),
	};

	let builder = match ChainBuilder::new(order, policy) {
		Ok(b) => b,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};
	let strip_gutenberg = query.strip_gutenberg.unwrap_or(false);
	let corpus_folder = folder.clone();
	let built = web::block(move || {
		read_corpus(&corpus_folder, strip_gutenberg).map(|corpus| {
			let mut chain = builder.build(&corpus);
			chain.set_source(corpus_folder.display().to_string());
			chain
		})
	})
	.await;
	let chain = match built {
		Ok(Ok(c)) => c,
		Ok(Err(e @ ModelError::NotADirectory(_))) => return HttpResponse::BadRequest().body(e.to_string()),
		Ok(Err(e)) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
		Err(e) => return HttpResponse::InternalServerError().body(format!("Chain build failed: {e}")),
	};
	let stats = chain.stats();

	let mut shared_data = match data.write() {
		Ok(d) => d,
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};
	shared_data.chain = chain;
	shared_data.settings.order = order;
	shared_data.settings.policy = policy;

	info!("reloaded chain from {}: {} states", folder.display(), stats.states);
	if stats.states == 0 {
		warn!("chain built from {} is empty, generation will fail", folder.display());
	}
	HttpResponse::Ok().json(stats)
}

/// Resolves settings (file, then flags) and builds the initial chain and
/// metadata side-chains.
fn load_shared_data(args: &Args) -> Result<SharedData, ModelError> {
	let mut settings = match &args.config {
		Some(path) => Settings::from_toml_file(path)?,
		None => Settings::default(),
	};
	if let Some(order) = args.order {
		settings.order = order;
	}
	if let Some(policy) = args.policy {
		settings.policy = policy;
	}
	settings.validate()?;

	let builder = ChainBuilder::new(settings.order, settings.policy)?;
	let chain = match &args.corpus {
		Some(folder) => {
			let folder = normalize_folder(folder);
			let mut chain = builder.build(&read_corpus(&folder, args.strip_gutenberg)?);
			chain.set_source(folder.display().to_string());
			chain
		}
		None => builder.empty(),
	};

	let metadata = match &args.metadata {
		Some(path) => Some(MetadataChains::build(&read_metadata(path)?, &settings)?),
		None => None,
	};

	Ok(SharedData { settings, chain, metadata })
}

/// Main entry point for the server.
///
/// Builds the initial chain, wraps it in a `RwLock` so that generation
/// requests share it read-only, and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000 unless told otherwise.
/// - Without `--corpus` the chain starts empty; use `PUT /v1/load`.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let shared_data = load_shared_data(&args)?;
	info!(
		"chain ready: order={} policy={} states={}",
		shared_data.settings.order,
		shared_data.settings.policy,
		shared_data.chain.len()
	);
	let shared_chain = web::Data::new(RwLock::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_chain.clone())
			.service(get_generated)
			.service(get_book)
			.service(get_chain)
			.service(put_load)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use markov_gen_core::metadata::parse_metadata;

	fn shared(corpus: &str, order: usize) -> web::Data<RwLock<SharedData>> {
		let settings = Settings { order, length: 12, ..Settings::default() };
		let chain = ChainBuilder::new(order, settings.policy).unwrap().build(corpus);
		web::Data::new(RwLock::new(SharedData { settings, chain, metadata: None }))
	}

	macro_rules! service {
		($data:expr) => {
			test::init_service(
				App::new()
					.app_data($data.clone())
					.service(get_generated)
					.service(get_book)
					.service(get_chain)
					.service(put_load),
			)
			.await
		};
	}

	#[actix_web::test]
	async fn generate_is_repeatable() {
		let data = shared("the cat sat on the mat. the dog sat on the log.", 1);
		let app = service!(data);

		let mut bodies = Vec::new();
		for _ in 0..2 {
			let request = test::TestRequest::get().uri("/v1/generate?seed=7&length=9").to_request();
			let response = test::call_service(&app, request).await;
			assert_eq!(response.status(), StatusCode::OK);
			bodies.push(test::read_body(response).await);
		}
		assert_eq!(bodies[0], bodies[1]);
		assert!(!bodies[0].is_empty());
	}

	#[actix_web::test]
	async fn empty_chain_is_unprocessable() {
		let data = shared("Hi.", 3);
		let app = service!(data);
		let request = test::TestRequest::get().uri("/v1/book?seed=1").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
	}

	#[actix_web::test]
	async fn zero_length_is_a_bad_request() {
		let data = shared("the cat sat on the mat.", 1);
		let app = service!(data);
		let request = test::TestRequest::get().uri("/v1/generate?length=0").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn lengths_above_the_ceiling_are_bad_requests() {
		let data = shared("the cat sat on the mat.", 1);
		let app = service!(data);

		for uri in [
			"/v1/generate?length=18446744073709551615",
			"/v1/generate?length=1000001",
			"/v1/book?length=18446744073709551615",
		] {
			let request = test::TestRequest::get().uri(uri).to_request();
			let response = test::call_service(&app, request).await;
			assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
		}
	}

	#[actix_web::test]
	async fn book_carries_the_metadata_header() {
		let settings = Settings { order: 1, length: 8, ..Settings::default() };
		let rows = parse_metadata("filename,title,author\nsea.txt,The Old Man and the Sea,Ernest Hemingway\n".as_bytes()).unwrap();
		let metadata = MetadataChains::build(&rows, &settings).unwrap();
		let chain = ChainBuilder::new(1, settings.policy).unwrap().build("the old man fished alone. the sea was calm.");
		let data = web::Data::new(RwLock::new(SharedData { settings, chain, metadata: Some(metadata) }));
		let app = service!(data);

		let request = test::TestRequest::get().uri("/v1/book?seed=3").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);
		let body = String::from_utf8(test::read_body(response).await.to_vec()).unwrap();
		assert!(body.starts_with("Title: "), "{body}");
		assert!(body.contains("\nAuthor: Ernest Hemingway\n\n"), "{body}");

		let request = test::TestRequest::get().uri("/v1/chain").to_request();
		let report: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(report["metadata"], true);
	}

	#[actix_web::test]
	async fn load_swaps_the_chain() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("a.txt"), "the cat sat on the mat. the dog sat on the log.").unwrap();
		let data = shared("Hi.", 3);
		let app = service!(data);

		let request = test::TestRequest::get().uri("/v1/generate?seed=1").to_request();
		assert_eq!(test::call_service(&app, request).await.status(), StatusCode::UNPROCESSABLE_ENTITY);

		let uri = format!("/v1/load?folder={}&order=2&policy=flat", dir.path().display());
		let request = test::TestRequest::put().uri(&uri).to_request();
		let stats: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(stats["order"], 2);
		assert_eq!(stats["policy"], "corpus-flat");
		assert_eq!(stats["states"], 8);

		{
			let shared_data = data.read().unwrap();
			assert_eq!(shared_data.settings.order, 2);
			assert_eq!(shared_data.settings.policy, TokenizePolicy::CorpusFlat);
			assert_eq!(shared_data.chain.len(), 8);
		}

		let request = test::TestRequest::get().uri("/v1/generate?seed=1&length=6").to_request();
		let response = test::call_service(&app, request).await;
		assert_eq!(response.status(), StatusCode::OK);
		assert!(!test::read_body(response).await.is_empty());
	}

	#[actix_web::test]
	async fn load_rejects_bad_parameters() {
		let data = shared("the cat sat on the mat.", 1);
		let app = service!(data);

		for uri in [
			"/v1/load",
			"/v1/load?folder=/definitely/not/here",
			"/v1/load?folder=.&policy=words",
			"/v1/load?folder=.&order=0",
		] {
			let request = test::TestRequest::put().uri(uri).to_request();
			let response = test::call_service(&app, request).await;
			assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
		}
	}

	#[actix_web::test]
	async fn chain_report_lists_stats() {
		let data = shared("a b a c.", 1);
		let app = service!(data);
		let request = test::TestRequest::get().uri("/v1/chain").to_request();
		let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
		assert_eq!(body["order"], 1);
		assert_eq!(body["policy"], "sentence-scoped");
		assert_eq!(body["states"], 2);
		assert_eq!(body["transitions"], 3);
		assert_eq!(body["metadata"], false);
	}
}
