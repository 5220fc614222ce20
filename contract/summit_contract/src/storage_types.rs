use soroban_sdk::{contracterror, contracttype, Address, Map, String, Vec};

// Storage keys for instance data
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    Admin,
    NativeAsset,
    NextCampaignId,
    NextMountainId,
    NextTokenId,
}

// Storage keys for persistent data
#[derive(Clone)]
#[contracttype]
pub enum PersistentKey {
    Campaign(CampaignId),
    CampaignMountains(CampaignId),
    CampaignParticipants(CampaignId),
    CampaignSponsors(CampaignId),
    Mountain(MountainId),
    Nft(TokenId),
    UserNfts(Address),
    Climbed(Address, MountainId),
}

pub type CampaignId = u32;
pub type MountainId = u32;
pub type TokenId = u64;

// Asset a sponsor contributed
#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub enum PrizeAsset {
    Native,
    Token(Address),
}

#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub start_date: u64,
    pub end_date: u64,
    pub native_pool: i128,
    pub token_pools: Map<Address, i128>,
    /// Sponsored token addresses in first-sponsorship order.
    pub tokens: Vec<Address>,
    pub participant_count: u32,
    pub is_active: bool,
    pub distributed: bool,
    pub created_at: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct Mountain {
    pub id: MountainId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub height: u32,            // Metres
    pub location: String,
    pub base_reward: i128,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct ClimbingNft {
    pub token_id: TokenId,
    pub owner: Address,
    pub mountain_id: MountainId,
    pub campaign_id: CampaignId,
    pub proof_uri: String,      // IPFS hash or similar
    pub verified: bool,
    pub minted_at: u64,
    pub verified_at: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct Sponsorship {
    pub sponsor: Address,
    pub sponsor_name: String,
    pub logo_uri: String,
    pub asset: PrizeAsset,
    pub amount: i128,
    pub sponsored_at: u64,
}

// Per-asset totals paid out by one distribution
#[derive(Clone, Debug, PartialEq)]
#[contracttype]
pub struct PayoutSummary {
    pub campaign_id: CampaignId,
    pub participants: u32,
    pub native_share: i128,
    pub native_remainder: i128,
    pub token_shares: Map<Address, i128>,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum SummitError {
    AlreadyInitialized     = 1,
    NotInitialized         = 2,
    InvalidTimeRange       = 3,
    CampaignNotFound       = 4,
    CampaignNotActive      = 5,
    CampaignEnded          = 6,
    CampaignNotStarted     = 7,
    CampaignStillActive    = 8,
    AlreadyDistributed     = 9,
    NoVerifiedParticipants = 10,
    MountainNotFound       = 11,
    MountainNotActive      = 12,
    NftNotFound            = 13,
    AlreadyVerified        = 14,
    AlreadyMinted          = 15,
    InvalidAmount          = 16,
    InvalidProof           = 17,
    ArithmeticError        = 18,
}

pub type Participants = Vec<Address>;

// Constants
pub const TTL_INSTANCE: u32 = 17280 * 30; // 30 days
pub const TTL_PERSISTENT: u32 = 17280 * 90; // 90 days
