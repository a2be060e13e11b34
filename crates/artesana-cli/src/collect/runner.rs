//! Bounded-concurrency processing of one category's products.

use artesana_core::{Category, CategoryReport, Product, ProductReport};
use artesana_scraper::{resolve_product, MaterializedProduct, Materializer, StorefrontClient};
use futures::stream::{self, StreamExt};

/// Resolves and materializes every product of `category`, at most
/// `concurrency` at a time. Reports keep discovery order.
///
/// Returns the category report and the download errors raised while
/// building it.
pub(super) async fn process_category(
    client: &StorefrontClient,
    materializer: Option<&Materializer>,
    category: Category,
    products: Vec<Product>,
    concurrency: usize,
) -> (CategoryReport, Vec<String>) {
    tracing::info!(
        category = %category.slug,
        products = products.len(),
        "processing category"
    );

    let category_ref = &category;
    let processed: Vec<(ProductReport, Vec<String>)> = stream::iter(products)
        .map(move |product| process_product(client, materializer, category_ref, product))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut errors = Vec::new();
    let mut reports = Vec::with_capacity(processed.len());
    for (report, product_errors) in processed {
        errors.extend(product_errors);
        reports.push(report);
    }

    (
        CategoryReport {
            category,
            products: reports,
        },
        errors,
    )
}

/// Resolves one product and, unless this is a dry run, downloads its images.
async fn process_product(
    client: &StorefrontClient,
    materializer: Option<&Materializer>,
    category: &Category,
    product: Product,
) -> (ProductReport, Vec<String>) {
    let resolution = resolve_product(client, &product).await;
    let status = resolution.status();
    let images = resolution.into_image_set();

    let materialized = match materializer {
        Some(materializer) => materializer.materialize(category, &product, &images).await,
        None => MaterializedProduct::default(),
    };
    let downloaded_images = materialized.downloaded_paths();

    tracing::debug!(
        product = %product.slug,
        ?status,
        downloaded = downloaded_images.len(),
        failed = materialized.errors.len(),
        "product processed"
    );

    let report = ProductReport {
        product,
        resolution: status,
        main_image: images.main_image,
        variants: images.variants,
        downloads: materialized.downloads,
        downloaded_image_count: downloaded_images.len(),
        downloaded_images,
    };
    (report, materialized.errors)
}
