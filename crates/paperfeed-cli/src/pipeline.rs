//! The run pipeline: collect or backfill, reconcile each enabled store,
//! render its Markdown view.

use std::path::Path;

use chrono::{Local, NaiveDate};
use log::info;
use paperfeed_core::reconcile::{self, CodeLinkResolver};
use paperfeed_core::render::{self, RenderOptions};
use paperfeed_core::store::{RecordStore, TopicBatch};
use paperfeed_net::codelink::PapersWithCode;
use paperfeed_net::HttpClient;

use crate::collect::Collector;
use crate::config::Config;

/// One full invocation. In collect mode the per-topic batches are
/// gathered once and merged into every enabled store; in update mode each
/// enabled store gets a link-backfill pass instead. Each phase ends by
/// rendering the store into its Markdown document.
pub fn run(config: &Config, update_paper_links: bool, client: &HttpClient) -> Result<(), String> {
    run_for_date(config, update_paper_links, client, Local::now().date_naive())
}

pub fn run_for_date(
    config: &Config,
    update_paper_links: bool,
    client: &HttpClient,
    today: NaiveDate,
) -> Result<(), String> {
    let mut table_batches: Vec<TopicBatch> = Vec::new();
    let mut digest_batches: Vec<TopicBatch> = Vec::new();

    info!("update paper links = {update_paper_links}");
    if !update_paper_links {
        info!("collecting daily papers");
        let collector = Collector::new(client, config.summarize_pdfs, config.pdf_dir.clone().into());
        for (topic, query) in config.topic_queries() {
            info!("topic {topic}: query {query}");
            let collected = collector.collect_topic(&topic, &query, config.max_results, today);
            table_batches.push(collected.table);
            digest_batches.push(collected.digest);
        }
        info!("collection finished");
    }

    let resolver = PapersWithCode::new(client);

    if config.publish_readme {
        let mut opts = RenderOptions::readme();
        opts.show_badge = config.show_badge;
        publish(
            &config.json_readme_path,
            &config.md_readme_path,
            &table_batches,
            update_paper_links,
            &resolver,
            &opts,
            today,
            "update readme",
        )?;
    }

    if config.publish_gitpage {
        let mut opts = RenderOptions::gitpage();
        opts.show_badge = config.show_badge;
        publish(
            &config.json_gitpage_path,
            &config.md_gitpage_path,
            &table_batches,
            update_paper_links,
            &resolver,
            &opts,
            today,
            "update gitpage",
        )?;
    }

    if config.publish_wechat {
        let mut opts = RenderOptions::wechat();
        opts.show_badge = config.show_badge;
        publish(
            &config.json_wechat_path,
            &config.md_wechat_path,
            &digest_batches,
            update_paper_links,
            &resolver,
            &opts,
            today,
            "update wechat",
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn publish(
    json_path: &str,
    md_path: &str,
    batches: &[TopicBatch],
    update_paper_links: bool,
    resolver: &dyn CodeLinkResolver,
    opts: &RenderOptions,
    today: NaiveDate,
    task: &str,
) -> Result<(), String> {
    let store_path = Path::new(json_path);
    if update_paper_links {
        reconcile::update_links(store_path, resolver).map_err(|err| err.to_string())?;
    } else {
        reconcile::merge_and_save(store_path, batches).map_err(|err| err.to_string())?;
    }

    let store = RecordStore::load(store_path).map_err(|err| err.to_string())?;
    let doc = render::render(&store, opts, today);
    render::write_markdown(Path::new(md_path), &doc)
        .map_err(|err| format!("write {md_path}: {err}"))?;
    info!("{task} finished");
    Ok(())
}
