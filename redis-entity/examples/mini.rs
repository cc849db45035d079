use redis_entity::{AttrMap, Error, RedisEntity, RedisStore, StringCommands, configure};

#[derive(RedisEntity)]
#[redis(pattern = "greeting:{language}", kind = "string")]
#[redis(example = "greeting:en")]
pub struct Greeting {
    pub language: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let store = RedisStore::connect("redis://127.0.0.1:6379").await?;
    configure(store.handle());

    let en = Greeting::from_key("greeting:en")?;
    en.set("hello").await?;

    let mut attrs = AttrMap::new();
    attrs.insert("language".to_string(), "fr".to_string());
    let fr = Greeting::from_map(&attrs)?;
    fr.set("bonjour").await?;

    for greeting in Greeting::scan().all().await? {
        println!("{} -> {:?}", greeting.key(), greeting.get().await?);
    }

    println!("count: {}", Greeting::scan().count().await?);

    Greeting::scan().flush().await?;

    Ok(())
}
