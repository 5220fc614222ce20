#![no_std]


mod events;
mod payout;
mod storage_types;

pub use payout::equal_split;
pub use storage_types::{
    Campaign, CampaignId, ClimbingNft, DataKey, Mountain, MountainId, Participants,
    PayoutSummary, PersistentKey, PrizeAsset, Sponsorship, SummitError, TokenId,
    TTL_INSTANCE, TTL_PERSISTENT,
};

use soroban_sdk::{contract, contractimpl, log, Address, Env, Map, String, Vec};

#[contract]
pub struct SummitContract;

#[contractimpl]
impl SummitContract {
    /// Initialize the ledger with its admin and the native asset contract
    /// used for the main prize pool.
    pub fn initialize(e: Env, admin: Address, native_asset: Address) -> Result<(), SummitError> {
        if e.storage().instance().has(&DataKey::Admin) {
            return Err(SummitError::AlreadyInitialized);
        }
        admin.require_auth();

        e.storage().instance().set(&DataKey::Admin, &admin);
        e.storage().instance().set(&DataKey::NativeAsset, &native_asset);
        e.storage().instance().set(&DataKey::NextCampaignId, &1u32);
        e.storage().instance().set(&DataKey::NextMountainId, &1u32);
        e.storage().instance().set(&DataKey::NextTokenId, &1u64);

        extend_instance(&e);
        Ok(())
    }

    pub fn transfer_admin(e: Env, new_admin: Address) -> Result<(), SummitError> {
        let admin = require_admin(&e)?;
        new_admin.require_auth();

        e.storage().instance().set(&DataKey::Admin, &new_admin);
        extend_instance(&e);
        log!(&e, "admin transferred", admin, new_admin);
        Ok(())
    }

    /// Create a time-boxed campaign. Ids are handed out from a monotonic counter.
    pub fn create_campaign(
        e: Env,
        name: String,
        start_date: u64,
        end_date: u64,
    ) -> Result<CampaignId, SummitError> {
        require_admin(&e)?;

        if end_date <= start_date {
            return Err(SummitError::InvalidTimeRange);
        }

        let campaign_id = next_u32(&e, &DataKey::NextCampaignId)?;
        let campaign = Campaign {
            id: campaign_id,
            name,
            start_date,
            end_date,
            native_pool: 0,
            token_pools: Map::new(&e),
            tokens: Vec::new(&e),
            participant_count: 0,
            is_active: true,
            distributed: false,
            created_at: e.ledger().timestamp(),
        };

        save_campaign(&e, &campaign);
        put_persistent(&e, &PersistentKey::CampaignMountains(campaign_id), &Vec::<MountainId>::new(&e));
        put_persistent(&e, &PersistentKey::CampaignParticipants(campaign_id), &Participants::new(&e));
        put_persistent(&e, &PersistentKey::CampaignSponsors(campaign_id), &Vec::<Sponsorship>::new(&e));
        extend_instance(&e);

        events::emit_campaign_created(
            &e,
            events::CampaignCreatedEvent {
                campaign_id,
                start_date,
                end_date,
            },
        );

        Ok(campaign_id)
    }

    pub fn set_campaign_active(e: Env, campaign_id: CampaignId, active: bool) -> Result<(), SummitError> {
        require_admin(&e)?;

        let mut campaign = load_campaign(&e, campaign_id)?;
        if campaign.distributed && active {
            return Err(SummitError::AlreadyDistributed);
        }
        campaign.is_active = active;
        save_campaign(&e, &campaign);
        Ok(())
    }

    /// Register a mountain under an existing campaign.
    pub fn add_mountain(
        e: Env,
        campaign_id: CampaignId,
        name: String,
        height: u32,
        location: String,
        base_reward: i128,
    ) -> Result<MountainId, SummitError> {
        require_admin(&e)?;
        load_campaign(&e, campaign_id)?;

        if base_reward < 0 {
            return Err(SummitError::InvalidAmount);
        }

        let mountain_id = next_u32(&e, &DataKey::NextMountainId)?;
        let mountain = Mountain {
            id: mountain_id,
            campaign_id,
            name,
            height,
            location,
            base_reward,
            is_active: true,
        };
        put_persistent(&e, &PersistentKey::Mountain(mountain_id), &mountain);

        let key = PersistentKey::CampaignMountains(campaign_id);
        let mut mountains: Vec<MountainId> = e.storage().persistent().get(&key).unwrap_or(Vec::new(&e));
        mountains.push_back(mountain_id);
        put_persistent(&e, &key, &mountains);
        extend_instance(&e);

        events::emit_mountain_added(
            &e,
            events::MountainAddedEvent {
                mountain_id,
                campaign_id,
                height,
            },
        );

        Ok(mountain_id)
    }

    pub fn set_mountain_active(e: Env, mountain_id: MountainId, active: bool) -> Result<(), SummitError> {
        require_admin(&e)?;

        let mut mountain = load_mountain(&e, mountain_id)?;
        mountain.is_active = active;
        put_persistent(&e, &PersistentKey::Mountain(mountain_id), &mountain);
        Ok(())
    }

    /// Contribute native asset to a campaign's main prize pool.
    pub fn sponsor_campaign(
        e: Env,
        sponsor: Address,
        campaign_id: CampaignId,
        sponsor_name: String,
        logo_uri: String,
        amount: i128,
    ) -> Result<(), SummitError> {
        let native_asset = native_asset(&e)?;
        Self::sponsor(e, sponsor, campaign_id, native_asset, PrizeAsset::Native, sponsor_name, logo_uri, amount)
    }

    /// Contribute a token to the campaign's pool for that token.
    pub fn sponsor_campaign_with_token(
        e: Env,
        sponsor: Address,
        campaign_id: CampaignId,
        token: Address,
        sponsor_name: String,
        logo_uri: String,
        amount: i128,
    ) -> Result<(), SummitError> {
        let asset = PrizeAsset::Token(token.clone());
        Self::sponsor(e, sponsor, campaign_id, token, asset, sponsor_name, logo_uri, amount)
    }

    /// Mint an unverified proof-of-climb NFT to the climber. The campaign's
    /// participant count only moves when the admin verifies it.
    pub fn mint_climbing_nft(
        e: Env,
        climber: Address,
        mountain_id: MountainId,
        proof_uri: String,
    ) -> Result<TokenId, SummitError> {
        climber.require_auth();

        if proof_uri.len() == 0 {
            return Err(SummitError::InvalidProof);
        }

        let mountain = load_mountain(&e, mountain_id)?;
        if !mountain.is_active {
            return Err(SummitError::MountainNotActive);
        }

        let campaign = load_campaign(&e, mountain.campaign_id)?;
        let now = e.ledger().timestamp();
        if !campaign.is_active {
            return Err(SummitError::CampaignNotActive);
        }
        if now < campaign.start_date {
            return Err(SummitError::CampaignNotStarted);
        }
        if now > campaign.end_date {
            return Err(SummitError::CampaignEnded);
        }

        let climbed_key = PersistentKey::Climbed(climber.clone(), mountain_id);
        if e.storage().persistent().has(&climbed_key) {
            return Err(SummitError::AlreadyMinted);
        }

        let token_id = next_u64(&e, &DataKey::NextTokenId)?;
        let nft = ClimbingNft {
            token_id,
            owner: climber.clone(),
            mountain_id,
            campaign_id: mountain.campaign_id,
            proof_uri,
            verified: false,
            minted_at: now,
            verified_at: None,
        };
        put_persistent(&e, &PersistentKey::Nft(token_id), &nft);
        put_persistent(&e, &climbed_key, &token_id);

        let owned_key = PersistentKey::UserNfts(climber.clone());
        let mut owned: Vec<TokenId> = e.storage().persistent().get(&owned_key).unwrap_or(Vec::new(&e));
        owned.push_back(token_id);
        put_persistent(&e, &owned_key, &owned);
        extend_instance(&e);

        events::emit_nft_minted(
            &e,
            events::NftMintedEvent {
                token_id,
                climber,
                mountain_id,
            },
        );

        Ok(token_id)
    }

    /// Mark an NFT verified. A climber is counted once per campaign no matter
    /// how many of their NFTs get verified.
    pub fn verify_nft(e: Env, token_id: TokenId) -> Result<(), SummitError> {
        require_admin(&e)?;

        let mut nft = load_nft(&e, token_id)?;
        if nft.verified {
            return Err(SummitError::AlreadyVerified);
        }

        let mut campaign = load_campaign(&e, nft.campaign_id)?;
        if campaign.distributed {
            return Err(SummitError::AlreadyDistributed);
        }

        nft.verified = true;
        nft.verified_at = Some(e.ledger().timestamp());
        put_persistent(&e, &PersistentKey::Nft(token_id), &nft);

        let participants_key = PersistentKey::CampaignParticipants(nft.campaign_id);
        let mut participants: Participants =
            e.storage().persistent().get(&participants_key).unwrap_or(Vec::new(&e));
        if !participants.contains(&nft.owner) {
            participants.push_back(nft.owner.clone());
            campaign.participant_count = participants.len();
            put_persistent(&e, &participants_key, &participants);
            save_campaign(&e, &campaign);
        }

        events::emit_nft_verified(
            &e,
            events::NftVerifiedEvent {
                token_id,
                climber: nft.owner,
                campaign_id: nft.campaign_id,
                participant_count: campaign.participant_count,
            },
        );

        Ok(())
    }

    /// Split every pool of an ended campaign equally among its verified
    /// participants. Runs at most once per campaign; integer-division dust
    /// stays in the pool fields.
    pub fn distribute_prizes(e: Env, campaign_id: CampaignId) -> Result<PayoutSummary, SummitError> {
        require_admin(&e)?;

        let mut campaign = load_campaign(&e, campaign_id)?;
        if campaign.distributed {
            return Err(SummitError::AlreadyDistributed);
        }
        if e.ledger().timestamp() <= campaign.end_date {
            return Err(SummitError::CampaignStillActive);
        }

        let participants: Participants = e
            .storage()
            .persistent()
            .get(&PersistentKey::CampaignParticipants(campaign_id))
            .unwrap_or(Vec::new(&e));
        let count = participants.len();

        let (native_share, native_remainder) = payout::equal_split(campaign.native_pool, count)?;
        payout::pay_each(&e, &native_asset(&e)?, &participants, native_share);

        let mut token_shares = Map::new(&e);
        let mut remaining_pools = Map::new(&e);
        for token in campaign.tokens.iter() {
            let pool = campaign.token_pools.get(token.clone()).unwrap_or(0);
            let (share, remainder) = payout::equal_split(pool, count)?;
            payout::pay_each(&e, &token, &participants, share);
            token_shares.set(token.clone(), share);
            remaining_pools.set(token, remainder);
        }

        campaign.native_pool = native_remainder;
        campaign.token_pools = remaining_pools;
        campaign.distributed = true;
        campaign.is_active = false;
        save_campaign(&e, &campaign);

        log!(&e, "prizes distributed", campaign_id, count, native_share);
        events::emit_prizes_distributed(
            &e,
            events::PrizesDistributedEvent {
                campaign_id,
                participants: count,
                native_share,
            },
        );

        Ok(PayoutSummary {
            campaign_id,
            participants: count,
            native_share,
            native_remainder,
            token_shares,
        })
    }

    /// View functions
    pub fn get_admin(e: Env) -> Result<Address, SummitError> {
        e.storage().instance().get(&DataKey::Admin).ok_or(SummitError::NotInitialized)
    }

    pub fn get_campaign(e: Env, campaign_id: CampaignId) -> Result<Campaign, SummitError> {
        load_campaign(&e, campaign_id)
    }

    pub fn get_campaign_count(e: Env) -> u32 {
        let next: u32 = e.storage().instance().get(&DataKey::NextCampaignId).unwrap_or(1);
        next - 1
    }

    pub fn get_mountain(e: Env, mountain_id: MountainId) -> Result<Mountain, SummitError> {
        load_mountain(&e, mountain_id)
    }

    pub fn get_campaign_mountains(e: Env, campaign_id: CampaignId) -> Result<Vec<MountainId>, SummitError> {
        load_campaign(&e, campaign_id)?;
        Ok(e.storage()
            .persistent()
            .get(&PersistentKey::CampaignMountains(campaign_id))
            .unwrap_or(Vec::new(&e)))
    }

    pub fn get_campaign_participants(e: Env, campaign_id: CampaignId) -> Result<Participants, SummitError> {
        load_campaign(&e, campaign_id)?;
        Ok(e.storage()
            .persistent()
            .get(&PersistentKey::CampaignParticipants(campaign_id))
            .unwrap_or(Vec::new(&e)))
    }

    pub fn get_campaign_sponsors(e: Env, campaign_id: CampaignId) -> Result<Vec<Sponsorship>, SummitError> {
        load_campaign(&e, campaign_id)?;
        Ok(e.storage()
            .persistent()
            .get(&PersistentKey::CampaignSponsors(campaign_id))
            .unwrap_or(Vec::new(&e)))
    }

    pub fn get_token_pool(e: Env, campaign_id: CampaignId, token: Address) -> Result<i128, SummitError> {
        let campaign = load_campaign(&e, campaign_id)?;
        Ok(campaign.token_pools.get(token).unwrap_or(0))
    }

    pub fn is_participant(e: Env, campaign_id: CampaignId, climber: Address) -> bool {
        e.storage()
            .persistent()
            .get::<PersistentKey, Participants>(&PersistentKey::CampaignParticipants(campaign_id))
            .map(|participants| participants.contains(&climber))
            .unwrap_or(false)
    }

    pub fn get_nft(e: Env, token_id: TokenId) -> Result<ClimbingNft, SummitError> {
        load_nft(&e, token_id)
    }

    pub fn get_user_nfts(e: Env, owner: Address) -> Vec<TokenId> {
        e.storage()
            .persistent()
            .get(&PersistentKey::UserNfts(owner))
            .unwrap_or(Vec::new(&e))
    }
}

impl SummitContract {
    #[allow(clippy::too_many_arguments)]
    fn sponsor(
        e: Env,
        sponsor: Address,
        campaign_id: CampaignId,
        asset_address: Address,
        asset: PrizeAsset,
        sponsor_name: String,
        logo_uri: String,
        amount: i128,
    ) -> Result<(), SummitError> {
        sponsor.require_auth();

        if amount <= 0 {
            return Err(SummitError::InvalidAmount);
        }

        let mut campaign = load_campaign(&e, campaign_id)?;
        if !campaign.is_active {
            return Err(SummitError::CampaignNotActive);
        }
        if e.ledger().timestamp() > campaign.end_date {
            return Err(SummitError::CampaignEnded);
        }

        payout::collect(&e, &asset_address, &sponsor, amount);

        match &asset {
            PrizeAsset::Native => {
                campaign.native_pool = campaign
                    .native_pool
                    .checked_add(amount)
                    .ok_or(SummitError::ArithmeticError)?;
            }
            PrizeAsset::Token(token) => {
                let pool = match campaign.token_pools.get(token.clone()) {
                    Some(pool) => pool,
                    None => {
                        campaign.tokens.push_back(token.clone());
                        0
                    }
                };
                let pool = pool.checked_add(amount).ok_or(SummitError::ArithmeticError)?;
                campaign.token_pools.set(token.clone(), pool);
            }
        }
        save_campaign(&e, &campaign);

        let sponsors_key = PersistentKey::CampaignSponsors(campaign_id);
        let mut sponsors: Vec<Sponsorship> = e.storage().persistent().get(&sponsors_key).unwrap_or(Vec::new(&e));
        sponsors.push_back(Sponsorship {
            sponsor: sponsor.clone(),
            sponsor_name,
            logo_uri,
            asset: asset.clone(),
            amount,
            sponsored_at: e.ledger().timestamp(),
        });
        put_persistent(&e, &sponsors_key, &sponsors);

        events::emit_campaign_sponsored(
            &e,
            events::CampaignSponsoredEvent {
                campaign_id,
                sponsor,
                asset,
                amount,
            },
        );

        Ok(())
    }
}

// Helper functions
fn extend_instance(e: &Env) {
    e.storage().instance().extend_ttl(TTL_INSTANCE, TTL_INSTANCE);
}

fn extend_persistent(e: &Env, key: &PersistentKey) {
    e.storage().persistent().extend_ttl(key, TTL_PERSISTENT, TTL_PERSISTENT);
}

fn put_persistent<V>(e: &Env, key: &PersistentKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    e.storage().persistent().set(key, value);
    extend_persistent(e, key);
}

fn require_admin(e: &Env) -> Result<Address, SummitError> {
    let admin: Address = e
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(SummitError::NotInitialized)?;
    admin.require_auth();
    Ok(admin)
}

fn native_asset(e: &Env) -> Result<Address, SummitError> {
    e.storage()
        .instance()
        .get(&DataKey::NativeAsset)
        .ok_or(SummitError::NotInitialized)
}

fn next_u32(e: &Env, key: &DataKey) -> Result<u32, SummitError> {
    let id: u32 = e.storage().instance().get(key).ok_or(SummitError::NotInitialized)?;
    let next = id.checked_add(1).ok_or(SummitError::ArithmeticError)?;
    e.storage().instance().set(key, &next);
    Ok(id)
}

fn next_u64(e: &Env, key: &DataKey) -> Result<u64, SummitError> {
    let id: u64 = e.storage().instance().get(key).ok_or(SummitError::NotInitialized)?;
    let next = id.checked_add(1).ok_or(SummitError::ArithmeticError)?;
    e.storage().instance().set(key, &next);
    Ok(id)
}

fn load_campaign(e: &Env, campaign_id: CampaignId) -> Result<Campaign, SummitError> {
    e.storage()
        .persistent()
        .get(&PersistentKey::Campaign(campaign_id))
        .ok_or(SummitError::CampaignNotFound)
}

fn save_campaign(e: &Env, campaign: &Campaign) {
    put_persistent(e, &PersistentKey::Campaign(campaign.id), campaign);
}

fn load_mountain(e: &Env, mountain_id: MountainId) -> Result<Mountain, SummitError> {
    e.storage()
        .persistent()
        .get(&PersistentKey::Mountain(mountain_id))
        .ok_or(SummitError::MountainNotFound)
}

fn load_nft(e: &Env, token_id: TokenId) -> Result<ClimbingNft, SummitError> {
    e.storage()
        .persistent()
        .get(&PersistentKey::Nft(token_id))
        .ok_or(SummitError::NftNotFound)
}
