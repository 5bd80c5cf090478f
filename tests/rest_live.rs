/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod helpers;

#[cfg(test)]
mod test {
    use crate::helpers;
    use flickr::rest::{Client, Collection, Photoset, Verb};

    // Talks to the real API. Needs FLICKR_API_KEY, FLICKR_API_SECRET and FLICKR_AUTH_CACHE.
    #[tokio::test]
    #[ignore]
    async fn live_account_queries() -> anyhow::Result<()> {
        dotenvy::dotenv().ok();
        helpers::init_logging();

        let client = Client::from_creds(helpers::get_full_auth_tokens()?)?;
        let login = client.call(Verb::Get, "flickr.test.login", &[]).await?;
        assert!(login.contains("<user"));

        let sets = Photoset::list(client.clone()).await?;
        println!("{} photosets", sets.len());
        let collections = Collection::list(client).await?;
        println!("{} collections", collections.len());
        Ok(())
    }
}
