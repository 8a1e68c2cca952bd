use std::io::{self, Write};
use std::sync::Arc;

use color_eyre::eyre::{bail, eyre, Result};
use futures::StreamExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        filters::Filters,
        item::{
            CategoryFile, DictionaryCategory, DocumentCategory, FaqCategory, HistoryEntry,
            PageItem,
        },
    },
    infrastructure::{
        cli::{Cli, Command, ListArgs, SelectArgs},
        config::Config,
        notifier::LogNotifier,
        resource::{Resource, ResourceKind},
        rest::RestFetcher,
    },
    integration::controller::IncrementalList,
    presentation::printer::{OutputFormat, Printer, Row},
};

pub struct App {
    pub config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops a running listing after the current page
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Scope(args) => {
                let scope = args
                    .select
                    .scope()
                    .ok_or_else(|| missing_category(&args.select))?;
                println!("{scope}");
                Ok(())
            }
            Command::List(args) => self.list(args).await,
        }
    }

    async fn list(&self, args: ListArgs) -> Result<()> {
        let resource = args
            .select
            .resource()
            .ok_or_else(|| missing_category(&args.select))?;
        let filters = args.select.filters();
        if !filters.has_valid_date_range() {
            bail!("--start-date must not be after --end-date");
        }

        match resource.kind() {
            ResourceKind::DictionaryCategories => {
                self.list_resource::<DictionaryCategory>(resource, filters, &args)
                    .await
            }
            ResourceKind::FaqCategories => {
                self.list_resource::<FaqCategory>(resource, filters, &args)
                    .await
            }
            ResourceKind::DocumentCategories => {
                self.list_resource::<DocumentCategory>(resource, filters, &args)
                    .await
            }
            ResourceKind::CategoryFiles => {
                self.list_resource::<CategoryFile>(resource, filters, &args)
                    .await
            }
            ResourceKind::History => {
                self.list_resource::<HistoryEntry>(resource, filters, &args)
                    .await
            }
        }
    }

    async fn list_resource<T>(
        &self,
        resource: Resource,
        filters: Filters,
        args: &ListArgs,
    ) -> Result<()>
    where
        T: PageItem + Row + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let fetcher = RestFetcher::<T>::new(self.config.api_client()?, resource);
        let list = IncrementalList::builder(fetcher)
            .codec(self.config.cursor_codec()?)
            .notifier(Arc::new(LogNotifier))
            .filters(filters)
            .build();
        tracing::info!("Listing scope {}", list.scope());

        let mut printer = Printer::new(args.format);
        let pages = list.pages();
        futures::pin_mut!(pages);

        let mut loaded = 0;
        while args.max_pages.is_none_or(|max| loaded < max) {
            let next = tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    log::info!("Listing interrupted after {loaded} page(s)");
                    break;
                }
                next = pages.next() => next,
            };
            match next {
                Some(Ok(batch)) => {
                    loaded += 1;
                    let mut out = io::stdout().lock();
                    printer.write_batch(&mut out, &batch)?;
                    out.flush()?;
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            }
        }

        let snapshot = list.snapshot();
        if args.format == OutputFormat::Table {
            eprintln!(
                "{} item(s) in {} page(s){}",
                printer.rows_written(),
                snapshot.pages_loaded,
                if snapshot.has_more { ", more available" } else { "" }
            );
        }
        Ok(())
    }
}

fn missing_category(select: &SelectArgs) -> color_eyre::eyre::Report {
    eyre!("{} requires --category-id", select.resource)
}
