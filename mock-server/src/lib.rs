use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beer {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub brewery: String,
    pub name: String,
    #[serde(default)]
    pub style: String,
    pub abv: f64,
    pub volume: f64,
    #[serde(default)]
    pub picture_url: String,
    #[serde(default = "default_how_many")]
    pub how_many: i32,
}

fn default_how_many() -> i32 {
    1
}

#[derive(Default)]
pub struct Cellar {
    beers: BTreeMap<i32, Beer>,
    next_id: i32,
}

impl Cellar {
    fn insert(&mut self, mut beer: Beer) -> Beer {
        self.next_id += 1;
        beer.id = self.next_id;
        self.beers.insert(beer.id, beer.clone());
        beer
    }
}

pub type Db = Arc<RwLock<Cellar>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router preloaded with `seed`. Ids are reassigned from 1 in seed order.
pub fn app_with(seed: Vec<Beer>) -> Router {
    let mut cellar = Cellar::default();
    for beer in seed {
        cellar.insert(beer);
    }
    let db: Db = Arc::new(RwLock::new(cellar));
    Router::new()
        .route("/api/beers", get(list_beers).post(create_beer))
        .route(
            "/api/beers/{key}",
            get(get_by_key).put(update_beer).delete(delete_beer),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, seed: Vec<Beer>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(seed)).await
}

async fn list_beers(State(db): State<Db>) -> Json<Vec<Beer>> {
    let cellar = db.read().await;
    Json(cellar.beers.values().cloned().collect())
}

async fn create_beer(State(db): State<Db>, Json(input): Json<Beer>) -> (StatusCode, Json<Beer>) {
    let beer = db.write().await.insert(input);
    debug!(id = beer.id, name = %beer.name, "beer created");
    (StatusCode::CREATED, Json(beer))
}

/// A numeric key addresses one beer; anything else is an owner name.
async fn get_by_key(
    State(db): State<Db>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let cellar = db.read().await;
    let value = match key.parse::<i32>() {
        Ok(id) => {
            let beer = cellar.beers.get(&id).ok_or(StatusCode::NOT_FOUND)?;
            serde_json::to_value(beer)
        }
        Err(_) => {
            let owned: Vec<&Beer> = cellar.beers.values().filter(|b| b.user == key).collect();
            serde_json::to_value(owned)
        }
    };
    value
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn update_beer(
    State(db): State<Db>,
    Path(id): Path<i32>,
    Json(input): Json<Beer>,
) -> Result<Json<Beer>, StatusCode> {
    let mut cellar = db.write().await;
    let beer = cellar.beers.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    *beer = Beer { id, ..input };
    Ok(Json(beer.clone()))
}

async fn delete_beer(State(db): State<Db>, Path(id): Path<i32>) -> Result<Json<Beer>, StatusCode> {
    let mut cellar = db.write().await;
    cellar.beers.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beer_serializes_with_wire_field_names() {
        let beer = Beer {
            id: 1,
            user: "a@x.com".to_string(),
            brewery: "Brew Co".to_string(),
            name: "Stout".to_string(),
            style: "Stout".to_string(),
            abv: 4.2,
            volume: 44.0,
            picture_url: "defaultUrl".to_string(),
            how_many: 2,
        };
        let json = serde_json::to_value(&beer).unwrap();
        assert_eq!(json["pictureUrl"], "defaultUrl");
        assert_eq!(json["howMany"], 2);
    }

    #[test]
    fn create_input_defaults_id_and_how_many() {
        let input: Beer =
            serde_json::from_str(r#"{"name":"Pils","abv":4.6,"volume":33}"#).unwrap();
        assert_eq!(input.id, 0);
        assert_eq!(input.how_many, 1);
    }

    #[test]
    fn create_input_rejects_missing_name() {
        let result: Result<Beer, _> = serde_json::from_str(r#"{"abv":4.6,"volume":33}"#);
        assert!(result.is_err());
    }

    #[test]
    fn cellar_assigns_increasing_ids() {
        let mut cellar = Cellar::default();
        let input: Beer = serde_json::from_str(r#"{"id":99,"name":"A","abv":1,"volume":1}"#).unwrap();
        assert_eq!(cellar.insert(input.clone()).id, 1);
        assert_eq!(cellar.insert(input).id, 2);
    }
}
