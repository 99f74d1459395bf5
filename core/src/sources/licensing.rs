//! # Licensing Interface Sources
//!
//! Three fetchers against the host's licensing management interfaces:
//! modern licensing products (partial key + activation status), the
//! licensing service's OA3x original key, and the legacy Office software
//! protection products. Absence of an interface is a per-source error,
//! never fatal to the host.

use keyscout_common::error::SourceError;
use keyscout_common::model::host::Host;
use keyscout_common::model::license::{LicenseStatus, LicensingProduct};
use keyscout_common::model::record::{KeySource, RawKey};

use crate::ports::{LicensingQuery, ManagementClient};

/// Modern licensing products. Only rows carrying a partial key represent a
/// recoverable fragment; the numeric status is mapped to its display text.
pub async fn software_licensing_products(
    client: &dyn ManagementClient,
    host: &Host,
) -> Result<Vec<RawKey>, SourceError> {
    let products = client
        .query_licensing_products(host, LicensingQuery::SoftwareLicensingProduct)
        .await?;
    Ok(keys_from_products(products, KeySource::LicensingProductA))
}

/// The licensing service's original (OA3x) product key. At most one record;
/// hosts without a firmware-embedded key yield none.
pub async fn original_product_key(
    client: &dyn ManagementClient,
    host: &Host,
) -> Result<Vec<RawKey>, SourceError> {
    let key = client.query_original_product_key(host).await?;
    Ok(key
        .filter(|k| !k.is_empty())
        .map(|k| RawKey {
            product_name: String::new(),
            product_id: String::new(),
            product_key: k,
            license_status: None,
            source: KeySource::LicensingServiceB,
            sentinel: false,
        })
        .into_iter()
        .collect())
}

/// Legacy Office software protection products.
pub async fn legacy_licensing_products(
    client: &dyn ManagementClient,
    host: &Host,
) -> Result<Vec<RawKey>, SourceError> {
    let products = client
        .query_licensing_products(host, LicensingQuery::OfficeSoftwareProtection)
        .await?;
    Ok(keys_from_products(products, KeySource::LegacyLicensingProduct))
}

fn keys_from_products(products: Vec<LicensingProduct>, source: KeySource) -> Vec<RawKey> {
    products
        .into_iter()
        .filter_map(|product| {
            let partial = product.partial_key.filter(|k| !k.is_empty())?;
            Some(RawKey {
                product_name: product.name,
                product_id: product.product_id,
                product_key: partial,
                license_status: product.license_status.map(LicenseStatus::from),
                source: source.clone(),
                sentinel: false,
            })
        })
        .collect()
}
