use chrono::{NaiveDate, Utc};

use crate::error::Result;
use crate::models::card::tidy_tags;
use crate::models::{Card, CardPatch, ListCardsQuery, Metadata, NewCard};
use crate::repository::CardRepository;
use crate::scheduler;
use crate::validator::Validator;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Card use cases: validation, then scheduling, then persistence.
#[derive(Clone)]
pub struct CardService {
    repo: CardRepository,
}

impl CardService {
    pub fn new(repo: CardRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: NewCard) -> Result<Card> {
        let input = NewCard {
            tags: tidy_tags(input.tags),
            ..input
        };

        let mut v = Validator::new();
        input.validate(&mut v);
        v.into_result()?;

        let card = self.repo.insert(&input, Utc::now()).await?;
        tracing::info!(card_id = card.id, next_review = %card.next_review_date, "card created");
        Ok(card)
    }

    pub async fn get(&self, id: i64) -> Result<Card> {
        self.repo.get(id).await
    }

    /// Apply a partial patch and, when asked, move the card up the review ladder.
    pub async fn update(&self, id: i64, patch: CardPatch) -> Result<Card> {
        let mut card = self.repo.get(id).await?;
        let reschedule = patch.reschedule_requested();
        patch.apply_to(&mut card);

        if reschedule {
            let next = scheduler::advance_review_date(
                card.created_at.date_naive(),
                card.next_review_date,
            );
            tracing::debug!(
                card_id = card.id,
                from = %card.next_review_date,
                to = %next,
                "rescheduling card"
            );
            card.next_review_date = next;
        }

        let mut v = Validator::new();
        card.validate(&mut v);
        v.into_result()?;

        self.repo.update(&card).await?;
        Ok(card)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!(card_id = id, "card deleted");
        Ok(())
    }

    pub async fn list(&self, query: &ListCardsQuery) -> Result<(Vec<Card>, Metadata)> {
        let search = query.resolve()?;
        self.repo.list(&search).await
    }

    /// Cards due today or overdue.
    pub async fn due(&self) -> Result<Vec<Card>> {
        self.repo.list_due(today()).await
    }

    pub async fn random(&self) -> Result<Card> {
        self.repo.get_random().await
    }
}
