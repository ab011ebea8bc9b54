use tabled::Table;

use crate::{
    cli::generate::{forget_token, load_client},
    error,
    materializer::list_all_playlists,
    types::PlaylistTableRow,
    utils, warning,
};

pub async fn playlists(search: Option<String>) {
    let (token_mgr, client) = load_client().await;

    let pb = utils::spinner("Fetching playlists...");
    let result = list_all_playlists(&client).await;
    pb.finish_and_clear();

    let mut playlists = match result {
        Ok(playlists) => playlists,
        Err(e) if e.is_credential() => {
            forget_token(&token_mgr).await;
            error!("Spotify rejected the credential. Err: {}", e);
        }
        Err(e) => error!("Failed to load playlists. Err: {}", e),
    };

    utils::filter_and_sort_playlists(&mut playlists, search.as_deref());
    if playlists.is_empty() {
        warning!("No playlists found.");
        return;
    }

    let table_rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            tracks: p.track_total(),
            name: p.name,
            id: p.id,
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
