use anyhow::{Result, anyhow};
use scraper::{Html, Selector};

use crate::models::CountryCodeEntry;

/// Parse the country code table from the IBAN country-codes page.
///
/// Each `<tr>` contributes its non-empty `<td>` texts. Only rows with exactly
/// four cells (name, alpha-2, alpha-3, numeric) are kept, which drops the
/// header row and layout rows.
pub fn parse_country_codes(html: &str) -> Result<Vec<CountryCodeEntry>> {
    let row_sel = Selector::parse("tr").map_err(|e| anyhow!("Invalid row selector: {:?}", e))?;
    let cell_sel = Selector::parse("td").map_err(|e| anyhow!("Invalid cell selector: {:?}", e))?;

    let document = Html::parse_document(html);
    let entries = document
        .select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
                .collect();
            match <[String; 4]>::try_from(cells) {
                Ok([country, alpha2, alpha3, numeric]) => Some(CountryCodeEntry {
                    country,
                    alpha2,
                    alpha3,
                    numeric,
                }),
                Err(_) => None,
            }
        })
        .collect();

    Ok(entries)
}
