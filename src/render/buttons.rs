use crate::{
    config::{Config, Source},
    error::LinkError,
    grafana::Alert,
    slack::block::{Button, Style},
};
use url::Url;

const EXPR_PARAMS: [&str; 2] = ["g0.expr", "expr"];

/// Buttons for one alert: details always, explore in external mode, runbook and
/// silence only while the alert is firing.
pub fn buttons(alert: &Alert, config: &Config) -> Vec<Button> {
    let mut buttons = vec![details_button(alert, &config.source)];

    if let Source::External {
        base_url,
        datasource,
        ..
    } = &config.source
    {
        buttons.extend(explore_button(alert, base_url, datasource.as_deref()));
    }

    if alert.is_resolved() {
        return buttons;
    }

    let runbook_url = alert.annotation("runbook_url");
    if !runbook_url.is_empty() {
        buttons.push(Button::new("runbook", "📃 Runbook", runbook_url));
    }

    if config.render.silence_buttons {
        buttons.extend(silence_button(alert, &config.source));
    }

    buttons
}

fn details_button(alert: &Alert, source: &Source) -> Button {
    let url = match source {
        Source::Native => alert.generator_url.clone(),
        Source::External {
            base_url,
            alertmanager,
            ..
        } => match groups_url(alert, base_url, alertmanager.as_deref()) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!("Falling back to generator url for details button: {}", e);
                alert.generator_url.clone()
            }
        },
    };

    Button::new("generator", "📈 Details", url).with_style(Style::Primary)
}

fn explore_button(alert: &Alert, base_url: &str, datasource: Option<&str>) -> Option<Button> {
    match explore_url(&alert.generator_url, base_url, datasource) {
        Ok(url) => Some(Button::new("explore", "🔭 Explore", url)),
        Err(e) => {
            tracing::warn!("Skipping explore button: {}", e);
            None
        }
    }
}

fn silence_button(alert: &Alert, source: &Source) -> Option<Button> {
    let url = match source {
        Source::Native => alert.silence_url.clone(),
        Source::External {
            base_url,
            alertmanager,
            ..
        } => match silence_url(alert, base_url, alertmanager.as_deref()) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!("Skipping silence button: {}", e);
                return None;
            }
        },
    };

    Some(Button::new("silence", "🔕 Silence", url).with_style(Style::Danger))
}

/// Alert groups page filtered down to the alert's labels
pub fn groups_url(
    alert: &Alert,
    base_url: &str,
    alertmanager: Option<&str>,
) -> Result<Url, LinkError> {
    let matchers = alert
        .sorted_labels()
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(",");

    let mut url = grafana_url(base_url, "alerting/groups")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("queryString", &matchers);
        if let Some(alertmanager) = alertmanager {
            query.append_pair("alertmanager", alertmanager);
        }
    }

    Ok(url)
}

/// New silence form with one matcher per label
pub fn silence_url(
    alert: &Alert,
    base_url: &str,
    alertmanager: Option<&str>,
) -> Result<Url, LinkError> {
    let mut url = grafana_url(base_url, "alerting/silence/new")?;
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in alert.sorted_labels() {
            query.append_pair("matcher", &format!("{name}={value}"));
        }
        if let Some(alertmanager) = alertmanager {
            query.append_pair("alertmanager", alertmanager);
        }
    }

    Ok(url)
}

/// Explore view running the query expression found in the generator url.
///
/// `datasource` names the Prometheus datasource of the pane. Grafana picks its
/// default datasource when it is unset.
pub fn explore_url(
    generator_url: &str,
    base_url: &str,
    datasource: Option<&str>,
) -> Result<Url, LinkError> {
    let generator = Url::parse(generator_url).map_err(|source| LinkError::GeneratorUrl {
        url: generator_url.to_string(),
        source,
    })?;

    let expr = EXPR_PARAMS
        .iter()
        .find_map(|param| {
            generator
                .query_pairs()
                .find(|(key, _)| key == param)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|expr| !expr.is_empty())
        .ok_or_else(|| LinkError::MissingExpr(generator_url.to_string()))?;

    let mut pane = serde_json::json!({
        "queries": [{ "refId": "A", "expr": expr }],
        "range": { "from": "now-1h", "to": "now" },
    });
    if let Some(datasource) = datasource {
        pane["datasource"] = serde_json::Value::from(datasource);
    }

    let mut url = grafana_url(base_url, "explore")?;
    url.query_pairs_mut().append_pair("left", &pane.to_string());

    Ok(url)
}

/// Join a path onto the base url, keeping any sub path Grafana is served from
fn grafana_url(base_url: &str, path: &str) -> Result<Url, LinkError> {
    let mut url = Url::parse(base_url).map_err(|source| LinkError::BaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);

    Ok(url)
}
