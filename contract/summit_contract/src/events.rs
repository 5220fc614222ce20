use soroban_sdk::{contracttype, Address, Env, Symbol};

use crate::storage_types::{CampaignId, MountainId, PrizeAsset, TokenId};

#[contracttype]
#[derive(Clone)]
pub struct CampaignCreatedEvent {
    pub campaign_id: CampaignId,
    pub start_date: u64,
    pub end_date: u64,
}

#[contracttype]
#[derive(Clone)]
pub struct MountainAddedEvent {
    pub mountain_id: MountainId,
    pub campaign_id: CampaignId,
    pub height: u32,
}

#[contracttype]
#[derive(Clone)]
pub struct CampaignSponsoredEvent {
    pub campaign_id: CampaignId,
    pub sponsor: Address,
    pub asset: PrizeAsset,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub struct NftMintedEvent {
    pub token_id: TokenId,
    pub climber: Address,
    pub mountain_id: MountainId,
}

#[contracttype]
#[derive(Clone)]
pub struct NftVerifiedEvent {
    pub token_id: TokenId,
    pub climber: Address,
    pub campaign_id: CampaignId,
    pub participant_count: u32,
}

#[contracttype]
#[derive(Clone)]
pub struct PrizesDistributedEvent {
    pub campaign_id: CampaignId,
    pub participants: u32,
    pub native_share: i128,
}

pub fn emit_campaign_created(env: &Env, event: CampaignCreatedEvent) {
    env.events().publish(
        (Symbol::new(env, "campaign"), Symbol::new(env, "created")),
        event,
    );
}

pub fn emit_mountain_added(env: &Env, event: MountainAddedEvent) {
    env.events().publish(
        (Symbol::new(env, "mountain"), Symbol::new(env, "added")),
        event,
    );
}

pub fn emit_campaign_sponsored(env: &Env, event: CampaignSponsoredEvent) {
    env.events().publish(
        (Symbol::new(env, "campaign"), Symbol::new(env, "sponsored")),
        event,
    );
}

pub fn emit_nft_minted(env: &Env, event: NftMintedEvent) {
    env.events().publish(
        (Symbol::new(env, "nft"), Symbol::new(env, "minted")),
        event,
    );
}

pub fn emit_nft_verified(env: &Env, event: NftVerifiedEvent) {
    env.events().publish(
        (Symbol::new(env, "nft"), Symbol::new(env, "verified")),
        event,
    );
}

pub fn emit_prizes_distributed(env: &Env, event: PrizesDistributedEvent) {
    env.events().publish(
        (Symbol::new(env, "campaign"), Symbol::new(env, "distributed")),
        event,
    );
}
