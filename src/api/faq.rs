use axum::Json;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Static FAQ content served to the frontend
static FAQ_ENTRIES: Lazy<Value> = Lazy::new(|| {
    json!([
        {
            "question": "What can I store in a box?",
            "answer": "Anything from furniture and seasonal tyres to documents and sports gear. Flammable, perishable and illegal goods are not accepted."
        },
        {
            "question": "How is the rental price calculated?",
            "answer": "Each box has a monthly price. The total is charged per day of the rental period at the monthly rate divided by 30."
        },
        {
            "question": "Can you pick up my belongings?",
            "answer": "Yes. Leave a pickup address when booking and our driver will collect your belongings and deliver them to the box."
        },
        {
            "question": "What happens when my rental ends?",
            "answer": "We remind you in advance by email. After the end date your belongings are kept for 6 months at an increased rate, after which they may be disposed of."
        },
        {
            "question": "Can I take out only part of my belongings?",
            "answer": "If partial pickup is allowed on the rental, you can collect individual items while the rest stays in the box."
        }
    ])
});

pub async fn get_faq() -> Json<Value> {
    Json(json!({ "faq": FAQ_ENTRIES.clone() }))
}
