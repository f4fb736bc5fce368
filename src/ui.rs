use crate::bucket::Calendar;
use crate::models::{DashboardResponse, DrinkLogRecord};
use crate::stats::{TrendCard, TrendMetric};
use crate::trend::{Assessment, TrendDirection};
use chrono::TimeZone;
use std::fmt::Display;

const RECENT_DRINKS: usize = 20;

/// Renders the dashboard page. Recent drinks are shown in the calendar's
/// time zone; charts are fetched by the page itself.
pub fn render_index<Tz>(
    dashboard: &DashboardResponse,
    recent: &[DrinkLogRecord],
    calendar: &Calendar<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    INDEX_HTML
        .replace("{{CARDS}}", &render_cards(dashboard))
        .replace("{{MOOD}}", &render_mood(dashboard))
        .replace("{{DRINKS}}", &render_drinks(recent, calendar))
}

fn render_cards(dashboard: &DashboardResponse) -> String {
    let totals = &dashboard.totals;
    let values = [
        (TrendMetric::Drinks, totals.total_quantity.to_string()),
        (TrendMetric::Spend, format!("${:.2}", totals.total_spend)),
        (TrendMetric::Calories, format!("{:.0}", totals.total_calories)),
        (
            TrendMetric::WeightGain,
            format!("{:.2} lbs", totals.estimated_weight_gain_lbs),
        ),
    ];

    values
        .iter()
        .map(|(metric, value)| {
            let indicator = dashboard
                .trends
                .iter()
                .find(|card| card.metric == *metric)
                .map(render_trend)
                .unwrap_or_default();
            format!(
                r#"<div class="card"><p class="label">Lifetime {}</p><p class="value">{}</p>{}</div>"#,
                metric.title(),
                value,
                indicator
            )
        })
        .collect()
}

fn render_trend(card: &TrendCard) -> String {
    let class = match card.assessment {
        Assessment::Favorable => "good",
        Assessment::Unfavorable => "bad",
        Assessment::Neutral => "flat",
    };
    let text = match card.trend.direction {
        TrendDirection::Stable => "No change vs last 7 days".to_string(),
        TrendDirection::Up => format!("&#9650; {:.1}% increase vs last 7 days", card.trend.percent_change),
        TrendDirection::Down => format!("&#9660; {:.1}% decrease vs last 7 days", card.trend.percent_change),
    };
    format!(r#"<p class="trend {class}">{text}</p>"#)
}

fn render_mood(dashboard: &DashboardResponse) -> String {
    let average = dashboard
        .average_mood
        .map(|mood| format!("{mood:.1} / 5"))
        .unwrap_or_else(|| "N/A".to_string());
    let trend = dashboard
        .trends
        .iter()
        .find(|card| card.metric == TrendMetric::Mood)
        .map(render_trend)
        .unwrap_or_default();

    let correlation = &dashboard.correlation;
    let insight = if correlation.days_analyzed == 0 {
        "Log your mood to see how drinking days compare.".to_string()
    } else {
        format!(
            "Drinking days average {:.1}, dry days {:.1} ({:+.1}) across {} days.",
            correlation.average_mood_with_drinks,
            correlation.average_mood_without_drinks,
            correlation.correlation_strength,
            correlation.days_analyzed
        )
    };

    format!(
        r#"<div class="card"><p class="label">Average Mood</p><p class="value">{average}</p>{trend}</div>
<div class="card wide"><p class="label">Mood &amp; Drinking</p><p>{insight}</p></div>"#
    )
}

fn render_drinks<Tz>(recent: &[DrinkLogRecord], calendar: &Calendar<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if recent.is_empty() {
        return r#"<p class="empty">No drinks logged yet.</p>"#.to_string();
    }

    let rows: String = recent
        .iter()
        .take(RECENT_DRINKS)
        .map(|drink| {
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>${:.2}</td><td>{:.0}</td><td><button data-id="{}" class="remove">Remove</button></td></tr>"#,
                drink
                    .timestamp
                    .with_timezone(&calendar.tz)
                    .format("%Y-%m-%d %H:%M"),
                escape_html(&drink.display_name()),
                drink.quantity,
                drink.spend(),
                drink.total_calories(),
                escape_html(&drink.id)
            )
        })
        .collect();

    format!(
        "<table><thead><tr><th>When</th><th>Drink</th><th>Qty</th><th>Spent</th><th>kcal</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>SipTrack</title>
  <style>
    :root {
      --bg: #f1f5f9;
      --ink: #1e293b;
      --muted: #64748b;
      --card: #ffffff;
      --good: #16a34a;
      --bad: #dc2626;
      --accent: #0891b2;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      max-width: 1080px;
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: 2.4rem;
      color: var(--accent);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 18px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 20px;
      box-shadow: 0 8px 24px rgba(15, 23, 42, 0.08);
    }

    .card.wide {
      grid-column: span 2;
    }

    .label {
      margin: 0;
      color: var(--muted);
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.06em;
    }

    .value {
      margin: 6px 0;
      font-size: 1.8rem;
      font-weight: 700;
    }

    .trend {
      margin: 0;
      font-size: 0.85rem;
    }

    .trend.good { color: var(--good); }
    .trend.bad { color: var(--bad); }
    .trend.flat { color: var(--muted); }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 10px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.8rem;
      color: var(--muted);
    }

    input, select, button {
      font: inherit;
      padding: 8px 10px;
      border-radius: 8px;
      border: 1px solid #cbd5e1;
    }

    button {
      background: var(--accent);
      color: #fff;
      border: none;
      cursor: pointer;
    }

    button.remove {
      background: transparent;
      color: var(--bad);
      padding: 4px 8px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid #e2e8f0;
    }

    .empty {
      color: var(--muted);
      text-align: center;
    }

    .error {
      color: var(--bad);
      min-height: 1.2em;
      margin: 0;
    }

    .chart-header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .chart-header h2 {
      margin: 0;
    }

    .tabs {
      display: flex;
      gap: 4px;
      padding: 4px;
      background: #e2e8f0;
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      color: var(--muted);
      border-radius: 999px;
      padding: 6px 12px;
    }

    .tab.active {
      background: #fff;
      color: var(--accent);
    }

    .chart {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart-bar { fill: var(--accent); }
    .chart-bar.alcohol { fill: #7c3aed; }
    .chart-bar.carbs { fill: #f59e0b; }
    .chart-bar.sugar { fill: #ec4899; }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: #fff;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: #e2e8f0;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .legend {
      display: flex;
      gap: 14px;
      font-size: 0.8rem;
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>SipTrack</h1>
      <p class="label">Consumption, spending &amp; mood</p>
    </header>

    <section class="card">
      <h2>Log a drink</h2>
      <form id="drink-form">
        <label>My drinks
          <select id="saved-drinks"><option value="">Enter details below</option></select>
        </label>
        <label>Brand <input name="brand" /></label>
        <label>Name <input name="name" required /></label>
        <label>Type <input name="type" placeholder="beer, wine, cocktail" /></label>
        <label>Volume (ml) <input name="volume_ml" type="number" step="any" min="0" /></label>
        <label>ABV (%) <input name="abv_percent" type="number" step="any" min="0" /></label>
        <label>Calories <input name="calories" type="number" step="any" min="0" /></label>
        <label>Carbs (g) <input name="carbs_g" type="number" step="any" min="0" /></label>
        <label>Sugar (g) <input name="sugar_g" type="number" step="any" min="0" /></label>
        <label>Price <input name="unit_price" type="number" step="any" min="0" /></label>
        <label>Quantity <input name="quantity" type="number" min="1" value="1" /></label>
        <label>Save to my drinks <input name="save" type="checkbox" /></label>
        <button type="submit">Log drink</button>
      </form>
      <p class="error" id="drink-error"></p>
    </section>

    <section class="grid">
      {{CARDS}}
    </section>

    <section class="grid">
      {{MOOD}}
    </section>

    <section class="card">
      <div class="chart-header">
        <h2>Spending</h2>
        <div class="tabs" role="tablist" data-chart="spending">
          <button class="tab active" type="button" data-period="weekly">Weekly</button>
          <button class="tab" type="button" data-period="monthly">Monthly</button>
        </div>
      </div>
      <svg id="spending-chart" class="chart" viewBox="0 0 600 240" role="img" aria-label="Spending chart"></svg>
    </section>

    <section class="card">
      <div class="chart-header">
        <h2>Calories</h2>
        <div class="tabs" role="tablist" data-chart="health">
          <button class="tab active" type="button" data-period="weekly">Weekly</button>
          <button class="tab" type="button" data-period="monthly">Monthly</button>
        </div>
      </div>
      <svg id="health-chart" class="chart" viewBox="0 0 600 240" role="img" aria-label="Calorie chart"></svg>
      <div class="legend">
        <span style="color: #7c3aed">Alcohol &amp; other</span>
        <span style="color: #f59e0b">Carbs</span>
        <span style="color: #ec4899">Sugar</span>
      </div>
    </section>

    <section class="card">
      <h2>Mood, last 30 days</h2>
      <svg id="mood-chart" class="chart" viewBox="0 0 600 240" role="img" aria-label="Mood chart"></svg>
    </section>

    <section class="card">
      <h2>How are you feeling today?</h2>
      <form id="mood-form">
        <label>Mood
          <select name="mood_level">
            <option value="1">1 - Very Low</option>
            <option value="2">2 - Low</option>
            <option value="3" selected>3 - Neutral</option>
            <option value="4">4 - Good</option>
            <option value="5">5 - Excellent</option>
          </select>
        </label>
        <label>Notes <input name="notes" /></label>
        <label>Tags (comma separated) <input name="tags" /></label>
        <button type="submit">Save mood</button>
      </form>
      <p class="error" id="mood-error"></p>
    </section>

    <section class="card">
      <h2>Recent drinks</h2>
      {{DRINKS}}
    </section>
  </main>

  <script>
    async function send(method, url, body, errorEl) {
      errorEl.textContent = '';
      const res = await fetch(url, {
        method,
        headers: body ? { 'Content-Type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined,
      });
      if (!res.ok) {
        errorEl.textContent = await res.text();
        return false;
      }
      return true;
    }

    const WIDTH = 600;
    const HEIGHT = 240;
    const PAD_X = 48;
    const PAD_Y = 30;
    const TOP = 16;

    const placeholder = (svg, text) => {
      svg.innerHTML = `<text class="chart-label" x="50%" y="50%" text-anchor="middle">${text}</text>`;
    };

    const axis = (max, format) => {
      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = (max * i) / 4;
        const y = HEIGHT - PAD_Y - (value / max) * (HEIGHT - TOP - PAD_Y);
        grid += `<line class="chart-grid" x1="${PAD_X}" y1="${y}" x2="${WIDTH - PAD_X}" y2="${y}" />`;
        grid += `<text class="chart-label" x="${PAD_X - 8}" y="${y + 4}" text-anchor="end">${format(value)}</text>`;
      }
      return grid;
    };

    // Each point is { label, segments: [{ value, className }] }; segments stack bottom-up.
    const renderBars = (svg, points, format, emptyText) => {
      if (!points.length) {
        placeholder(svg, emptyText);
        return;
      }
      const totals = points.map((p) => p.segments.reduce((sum, s) => sum + s.value, 0));
      const max = Math.max(...totals) || 1;
      const slot = (WIDTH - PAD_X * 2) / points.length;
      const barWidth = Math.max(4, slot * 0.6);
      const scale = (HEIGHT - TOP - PAD_Y) / max;
      const labelEvery = points.length > 10 ? Math.ceil(points.length / 10) : 1;

      let bars = '';
      points.forEach((point, index) => {
        const x = PAD_X + index * slot + (slot - barWidth) / 2;
        let base = HEIGHT - PAD_Y;
        point.segments.forEach((segment) => {
          const h = segment.value * scale;
          base -= h;
          bars += `<rect class="chart-bar ${segment.className}" x="${x}" y="${base}" width="${barWidth}" height="${h}"><title>${point.label}: ${format(segment.value)}</title></rect>`;
        });
        if (index % labelEvery === 0) {
          bars += `<text class="chart-label" x="${x + barWidth / 2}" y="${HEIGHT - PAD_Y + 16}" text-anchor="middle">${point.label}</text>`;
        }
      });
      svg.innerHTML = axis(max, format) + bars;
    };

    const renderMood = (svg, points) => {
      if (!points.length) {
        placeholder(svg, 'No mood data yet');
        return;
      }
      const step = points.length > 1 ? (WIDTH - PAD_X * 2) / (points.length - 1) : 0;
      const x = (index) => PAD_X + index * step;
      const y = (mood) => HEIGHT - PAD_Y - (mood / 5) * (HEIGHT - TOP - PAD_Y);
      const path = points.map((p, i) => `${i === 0 ? 'M' : 'L'} ${x(i).toFixed(2)} ${y(p.mood).toFixed(2)}`).join(' ');
      const circles = points
        .map((p, i) => `<circle class="chart-point" cx="${x(i)}" cy="${y(p.mood)}" r="4"><title>${p.label}: ${p.mood}</title></circle>`)
        .join('');
      const labelEvery = points.length > 10 ? Math.ceil(points.length / 10) : 1;
      const labels = points
        .map((p, i) => (i % labelEvery === 0
          ? `<text class="chart-label" x="${x(i)}" y="${HEIGHT - PAD_Y + 16}" text-anchor="middle">${p.label}</text>`
          : ''))
        .join('');
      svg.innerHTML = axis(5, (v) => v.toFixed(0)) + `<path class="chart-line" d="${path}" />` + circles + labels;
    };

    const money = (v) => '$' + v.toFixed(2);
    const kcal = (v) => Math.round(v).toString();

    const loadSpending = async (period) => {
      const res = await fetch('/api/charts/spending?period=' + period);
      const points = res.ok ? await res.json() : [];
      renderBars(
        document.getElementById('spending-chart'),
        points.map((p) => ({ label: p.label, segments: [{ value: p.spending, className: '' }] })),
        money,
        'Log some drinks to see your spending trend.'
      );
    };

    const loadHealth = async (period) => {
      const res = await fetch('/api/charts/health?period=' + period);
      const points = res.ok ? await res.json() : [];
      renderBars(
        document.getElementById('health-chart'),
        points.map((p) => ({
          label: p.label,
          segments: [
            { value: p.calories_from_alcohol, className: 'alcohol' },
            { value: p.calories_from_carbs, className: 'carbs' },
            { value: p.calories_from_sugar, className: 'sugar' },
          ],
        })),
        kcal,
        'Log some drinks to see your calorie breakdown.'
      );
    };

    const loadMood = async () => {
      const res = await fetch('/api/charts/mood');
      renderMood(document.getElementById('mood-chart'), res.ok ? await res.json() : []);
    };

    const loaders = { spending: loadSpending, health: loadHealth };

    document.querySelectorAll('.tabs[data-chart]').forEach((group) => {
      const load = loaders[group.dataset.chart];
      group.querySelectorAll('.tab').forEach((tab) => {
        tab.addEventListener('click', () => {
          group.querySelectorAll('.tab').forEach((other) => other.classList.toggle('active', other === tab));
          load(tab.dataset.period);
        });
      });
      load('weekly');
    });
    loadMood();

    let savedDrinks = [];
    const savedSelect = document.getElementById('saved-drinks');
    const drinkForm = document.getElementById('drink-form');

    const loadSavedDrinks = async () => {
      const res = await fetch('/api/saved-drinks');
      if (!res.ok) {
        return;
      }
      savedDrinks = await res.json();
      savedDrinks.forEach((drink, index) => {
        const option = document.createElement('option');
        option.value = String(index);
        option.textContent = [drink.brand, drink.name].filter(Boolean).join(' ') + (drink.type ? ` (${drink.type})` : '');
        savedSelect.appendChild(option);
      });
    };

    savedSelect.addEventListener('change', () => {
      const drink = savedDrinks[Number(savedSelect.value)];
      if (!savedSelect.value || !drink) {
        return;
      }
      for (const field of ['brand', 'name', 'type', 'volume_ml', 'abv_percent', 'calories', 'carbs_g', 'sugar_g', 'unit_price']) {
        drinkForm.elements[field].value = drink[field] ?? '';
      }
      drinkForm.elements.save.checked = true;
    });
    loadSavedDrinks();

    drinkForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      const errorEl = document.getElementById('drink-error');
      const payload = Object.fromEntries(new FormData(event.target).entries());
      const save = payload.save === 'on';
      delete payload.save;
      if (!(await send('POST', '/api/drinks', payload, errorEl))) {
        return;
      }
      if (save && !(await send('POST', '/api/saved-drinks', payload, errorEl))) {
        return;
      }
      window.location.reload();
    });

    document.getElementById('mood-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      const payload = {
        mood_level: Number(form.get('mood_level')),
        notes: form.get('notes'),
        tags: String(form.get('tags') || '').split(','),
      };
      if (await send('POST', '/api/moods', payload, document.getElementById('mood-error'))) {
        window.location.reload();
      }
    });

    document.querySelectorAll('button.remove').forEach((button) => {
      button.addEventListener('click', async () => {
        const url = '/api/drinks/' + encodeURIComponent(button.dataset.id);
        if (await send('DELETE', url, null, document.getElementById('drink-error'))) {
          window.location.reload();
        }
      });
    });
  </script>
</body>
</html>
"#;
